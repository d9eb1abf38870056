//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap the upstream call with the configured ceiling
//! - Cancel the call cleanly on timeout
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Expiry drops the wrapped future, so in-flight I/O is aborted rather than
//!   left running in the background
//! - Timeout errors are distinct from other errors
//! - Timed-out requests return 504 Gateway Timeout

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

/// The ceiling elapsed before the wrapped future completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("deadline of {0:?} elapsed")]
pub struct DeadlineElapsed(pub Duration);

/// Run `future` under an optional ceiling.
///
/// With `None` the future runs to completion and the caller's environment is
/// responsible for any deadline.
pub async fn with_ceiling<F>(ceiling: Option<Duration>, future: F) -> Result<F::Output, DeadlineElapsed>
where
    F: Future,
{
    match ceiling {
        Some(limit) => tokio::time::timeout(limit, future)
            .await
            .map_err(|_| DeadlineElapsed(limit)),
        None => Ok(future.await),
    }
}
