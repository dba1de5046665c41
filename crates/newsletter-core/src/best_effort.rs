//! Best-effort operations
//!
//! A best-effort operation is awaited like any other future, but its
//! failure is converted into [`BestEffortOutcome::Discarded`] and logged.
//! The outcome is not a `Result`, so it cannot be propagated with `?`.

use std::future::Future;

use tracing::{debug, warn};

/// Outcome of an operation whose failure must not reach the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BestEffortOutcome<T> {
    /// The operation completed
    Completed(T),
    /// The operation failed; the error was logged and dropped
    Discarded {
        /// Rendered error message
        error: String,
    },
}

impl<T> BestEffortOutcome<T> {
    pub fn is_completed(&self) -> bool {
        matches!(self, BestEffortOutcome::Completed(_))
    }

    /// The completed value, if any
    pub fn completed(self) -> Option<T> {
        match self {
            BestEffortOutcome::Completed(value) => Some(value),
            BestEffortOutcome::Discarded { .. } => None,
        }
    }
}

/// Await `operation`, logging and discarding any error
pub async fn best_effort<T, F>(label: &str, operation: F) -> BestEffortOutcome<T>
where
    F: Future<Output = crate::Result<T>>,
{
    match operation.await {
        Ok(value) => {
            debug!("{} completed", label);
            BestEffortOutcome::Completed(value)
        }
        Err(e) => {
            warn!("{} failed (discarded): {}", label, e);
            BestEffortOutcome::Discarded {
                error: e.to_string(),
            }
        }
    }
}
