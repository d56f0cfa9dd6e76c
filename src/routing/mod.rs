//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request path
//!     → resolver.rs (prefix match, port extraction)
//!     → Return: ProxyRoute or RouteError
//! ```
//!
//! # Design Decisions
//! - Two fixed route shapes: `/proxy/<port>/<rest>` (rewriting) and
//!   `/absproxy/<port>/<rest>` (passthrough)
//! - Mode carried as a tagged variant through the whole request lifecycle
//! - Resolution is a pure function over the encoded path; no decoding
//! - Prefix miss is an explicit NotFound so the host can fall through

pub mod resolver;

pub use resolver::{resolve, ProxyMode, ProxyRoute, RouteError, PASSTHROUGH_PREFIX, REWRITE_PREFIX};
