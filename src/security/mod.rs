//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → limits.rs (cap request body size)
//!     → Pass to dispatch
//!
//! Outgoing relay response:
//!     → headers.rs (CORS headers on success and failure alike)
//! ```

pub mod headers;
pub mod limits;

pub use headers::CorsPolicy;
