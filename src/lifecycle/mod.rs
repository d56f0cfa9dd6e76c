//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     Load config → Validate → Bind listener → Serve
//!
//! Shutdown:
//!     Signal received → Stop accepting → Drain in-flight requests → Exit
//! ```

pub mod shutdown;

pub use shutdown::Shutdown;
