//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, proxy handler)
//!     → [routing resolver decides mode + target]
//!     → forward.rs (strip hop-by-hop headers, issue upstream request)
//!     → response.rs (copy status/headers, Location rewrite, stream body)
//!     → Send to client
//!
//! On failure:
//!     → error.rs (map to a complete HTTP error response)
//! ```

pub mod error;
pub mod forward;
pub mod response;
pub mod server;

pub use error::ProxyError;
pub use server::{build_router, AppState, HttpServer};
