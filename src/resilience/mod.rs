//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to upstream:
//!     → timeouts.rs (enforce the exchange ceiling)
//!     → On failure: surfaced to the client as a final outcome
//! ```
//!
//! # Design Decisions
//! - Every upstream call has a deadline unless the host environment owns it
//! - No retries: chat completions are not idempotent, retrying is the caller's call

pub mod timeouts;

pub use timeouts::{with_ceiling, DeadlineElapsed};
