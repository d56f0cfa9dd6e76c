//! Portgate - path-addressed reverse proxy library.
//!
//! Forwards requests under `/proxy/<port>/<rest>` to
//! `http://<target-host>:<port>/<rest>`, rewriting upstream-relative
//! redirects back under the public base path. `/absproxy/<port>/<rest>`
//! forwards the full path unmodified.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
