//! Error types for task entity operations.

use thiserror::Error;

use super::TaskStatus;

/// Errors produced by task lifecycle operations.
///
/// Every failing operation returns one of these and leaves the snapshot
/// untouched; there is no partial mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    /// The requested transition is not in the lifecycle table.
    ///
    /// A driver should treat this as a logic bug (log and skip).
    #[error("invalid status transition: {current} -> {attempted}")]
    InvalidTransition {
        /// State the task was in when the command arrived.
        current: TaskStatus,
        /// State the command tried to move to.
        attempted: TaskStatus,
    },

    /// Retry requested after the retry budget was spent.
    #[error("retry limit reached: {retry_count} of {max_retries} attempts used")]
    RetryExhausted {
        /// Failures recorded so far (may exceed the budget).
        retry_count: u32,
        /// Configured retry ceiling.
        max_retries: u32,
    },

    /// Task construction rejected by field validation.
    #[error("invalid task: {reason}")]
    Validation {
        /// All failed checks, joined with `"; "`.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_transition_message_names_both_states() {
        let err = TaskError::InvalidTransition {
            current: TaskStatus::Completed,
            attempted: TaskStatus::Downloading,
        };
        let msg = err.to_string();
        assert!(msg.contains("completed"));
        assert!(msg.contains("downloading"));
    }

    #[test]
    fn test_retry_exhausted_message() {
        let err = TaskError::RetryExhausted {
            retry_count: 3,
            max_retries: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("retry limit"));
        assert!(msg.contains('3'));
    }
}
