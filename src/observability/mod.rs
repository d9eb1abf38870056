//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Relay and server produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stderr log stream
//!     → Metrics endpoint (Prometheus scrape), when enabled
//! ```
//!
//! # Design Decisions
//! - Every request is logged inside a `request` span carrying its
//!   `x-request-id`, so relay log lines can be joined to the response header
//! - Metrics are cheap (atomic increments) and no-ops without a recorder
//! - The credential header is never a log field

pub mod logging;
pub mod metrics;
