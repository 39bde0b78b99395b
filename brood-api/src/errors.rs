//! # Wait Failure Types
//!
//! Waiting on a task handle can fail in three ways. All of them are
//! normalized by the collector into a failure report with the sentinel id,
//! so callers never see these errors escape a collection run.
//!
//! ## Usage Example
//!
//! ```rust
//! use brood_api::errors::WaitError;
//! use std::time::Duration;
//!
//! fn describe(error: &WaitError) -> &'static str {
//!     match error {
//!         WaitError::TimedOut(_) => "worker was too slow",
//!         WaitError::Cancelled => "worker dropped the task",
//!         WaitError::Internal(_) => "task crashed",
//!     }
//! }
//!
//! assert_eq!(describe(&WaitError::TimedOut(Duration::from_secs(1))), "worker was too slow");
//! ```

use std::time::Duration;
use thiserror::Error;

/// Why a wait on a task handle produced no value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WaitError {
    /// The task did not finish within the allowed time.
    ///
    /// The task itself keeps running; only the wait gave up.
    #[error("Task did not complete within {0:?}")]
    TimedOut(Duration),

    /// The task was dropped before it reported a value, e.g. its pool went
    /// away with the task still queued.
    #[error("Task was cancelled before reporting a result")]
    Cancelled,

    /// The task failed inside the worker (panicked).
    #[error("Task failed inside the worker: {0}")]
    Internal(String),
}

impl WaitError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, WaitError::TimedOut(_))
    }
}

pub type WaitResult<T> = Result<T, WaitError>;
