//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Proxy handler produces:
//!     → structured log events (tracing)
//!     → counters and histograms (metrics.rs)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging via the tracing crate
//! - Request ID flows through log events and to the upstream
//! - Metrics are cheap (atomic increments)

pub mod metrics;
