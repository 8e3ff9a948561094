//! Task lifecycle states and the legal-transition table.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle state of a download task.
///
/// `Completed` and `Cancelled` are terminal with respect to normal flow;
/// `Failed` can cycle back to `Pending` through a gated retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Waiting to be dispatched.
    Pending,
    /// Transfer in flight.
    Downloading,
    /// Transfer suspended by the user.
    Paused,
    /// Transfer finished successfully.
    Completed,
    /// Transfer attempt failed.
    Failed,
    /// Abandoned by the user.
    Cancelled,
}

impl TaskStatus {
    /// Returns the stable string representation (also used for storage).
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Downloading => "downloading",
            Self::Paused => "paused",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns true when moving from this state to `next` is a legal
    /// transition.
    ///
    /// The table: `{Pending, Paused} -> Downloading`,
    /// `Downloading -> {Paused, Completed, Failed}`, `Failed -> Pending`,
    /// and any state except `Completed` may move to `Cancelled`.
    #[must_use]
    pub fn can_transition_to(self, next: TaskStatus) -> bool {
        match (self, next) {
            (Self::Pending | Self::Paused, Self::Downloading)
            | (Self::Downloading, Self::Paused | Self::Completed | Self::Failed)
            | (Self::Failed, Self::Pending) => true,
            (current, Self::Cancelled) => current != Self::Completed,
            _ => false,
        }
    }

    /// True when a start command is accepted from this state.
    #[must_use]
    pub fn can_start(self) -> bool {
        matches!(self, Self::Pending | Self::Paused)
    }

    /// True when a pause command is accepted from this state.
    #[must_use]
    pub fn can_pause(self) -> bool {
        self == Self::Downloading
    }

    /// True when a resume command is accepted from this state.
    #[must_use]
    pub fn can_resume(self) -> bool {
        self == Self::Paused
    }

    /// True when a cancel command is accepted from this state.
    #[must_use]
    pub fn can_cancel(self) -> bool {
        self != Self::Completed
    }

    /// True when a retry command is accepted from this state (the retry
    /// budget is checked separately by the entity).
    #[must_use]
    pub fn can_retry(self) -> bool {
        self == Self::Failed
    }

    /// True when the task counts against the concurrency ceiling.
    #[must_use]
    pub fn is_active(self) -> bool {
        matches!(self, Self::Pending | Self::Downloading)
    }

    /// True for states with no outgoing transitions in normal flow.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "downloading" => Ok(Self::Downloading),
            "paused" => Ok(Self::Paused),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("invalid task status: {s}")),
        }
    }
}
