//! Download task entity: immutable snapshots and lifecycle operations.
//!
//! A [`TaskSnapshot`] is a flat, serializable value describing one download
//! job at a point in time. It is never mutated in place: every command
//! (`start`, `pause`, `complete`, ...) either returns a fresh snapshot or a
//! [`TaskError`], so a failed command leaves no partial state behind.
//!
//! The one deliberate exception is [`TaskSnapshot::update_progress`], which
//! silently returns the snapshot unchanged when the task is not downloading.
//! Progress events arrive from the transfer engine and can race a pause or
//! cancel command; the status check must happen before any field is touched.
//!
//! # Example
//!
//! ```
//! use mediadl_core::measure::{FileSize, Speed};
//! use mediadl_core::task::{DEFAULT_PRIORITY, NewTask, Quality, TaskSnapshot, TaskStatus};
//!
//! let task = TaskSnapshot::create(NewTask {
//!     id: "task-1".into(),
//!     owner_id: "user-1".into(),
//!     media_id: "movie-42".into(),
//!     title: "Example Movie".into(),
//!     quality: Quality::Hd,
//!     format: "mkv".into(),
//!     download_url: "https://cdn.example.com/movie-42.mkv".into(),
//!     magnet_link: None,
//!     total_size: FileSize::from_bytes(1000),
//!     priority: DEFAULT_PRIORITY,
//! })?;
//!
//! let task = task.start()?;
//! let task = task.update_progress(FileSize::from_bytes(500), Speed::from_bytes_per_second(100), None);
//! assert_eq!(task.progress, 50.0);
//!
//! let (task, history) = task.complete("/downloads/movie-42.mkv")?;
//! assert_eq!(task.status, TaskStatus::Completed);
//! assert_eq!(history.file_size, task.total_size);
//! # Ok::<(), mediadl_core::task::TaskError>(())
//! ```

mod error;
mod history;
mod quality;
mod status;

pub use error::TaskError;
pub use history::HistoryRecord;
pub use quality::Quality;
pub use status::TaskStatus;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::measure::{FileSize, Speed};

/// Default retry budget for new tasks.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default priority for new tasks (middle of the 0-10 range).
pub const DEFAULT_PRIORITY: u8 = 5;

/// Highest allowed priority; `set_priority` clamps to `0..=MAX_PRIORITY`.
pub const MAX_PRIORITY: u8 = 10;

/// Rounds to two decimal places.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Parameters for creating a new task via [`TaskSnapshot::create`].
#[derive(Debug, Clone)]
pub struct NewTask {
    /// Caller-assigned unique id.
    pub id: String,
    /// Owning user id.
    pub owner_id: String,
    /// Media item to download.
    pub media_id: String,
    /// Media title, shown in listings and history.
    pub title: String,
    /// Requested quality tier.
    pub quality: Quality,
    /// Container format (e.g. `mkv`, `mp4`).
    pub format: String,
    /// Primary source locator.
    pub download_url: String,
    /// Optional secondary source locator.
    pub magnet_link: Option<String>,
    /// Expected total size of the file.
    pub total_size: FileSize,
    /// Initial priority; clamped to `0..=10`.
    pub priority: u8,
}

impl NewTask {
    /// Checks the fields a task cannot function without.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::Validation`] listing every failed check.
    pub fn validate(&self) -> Result<(), TaskError> {
        let mut problems = Vec::new();

        if self.id.trim().is_empty() {
            problems.push("task id must not be empty");
        }
        if self.media_id.trim().is_empty() {
            problems.push("media id must not be empty");
        }
        if self.title.trim().is_empty() {
            problems.push("title must not be empty");
        }
        if self.total_size.bytes() == 0 {
            problems.push("total size must be greater than zero");
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(TaskError::Validation {
                reason: problems.join("; "),
            })
        }
    }
}

/// Immutable snapshot of one download task.
///
/// All fields are public; the snapshot is a plain value. State only changes
/// by calling an operation that returns a new snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSnapshot {
    /// Unique task id.
    pub id: String,
    /// Owning user id.
    pub owner_id: String,
    /// Media item being downloaded.
    pub media_id: String,
    /// Media title.
    pub title: String,
    /// Requested quality tier.
    pub quality: Quality,
    /// Container format.
    pub format: String,
    /// Primary source locator.
    pub download_url: String,
    /// Optional secondary source locator.
    pub magnet_link: Option<String>,
    /// Current lifecycle state.
    pub status: TaskStatus,
    /// Completion percentage in `0.0..=100.0`, two decimals.
    pub progress: f64,
    /// Bytes received so far; never exceeds `total_size`.
    pub downloaded_size: FileSize,
    /// Expected total size.
    pub total_size: FileSize,
    /// Most recently reported transfer rate.
    pub speed: Speed,
    /// Transfer engine's remaining-time estimate, in milliseconds.
    pub estimated_time_remaining: Option<u64>,
    /// Error text from the last failed attempt.
    pub error_message: Option<String>,
    /// Failures recorded so far; incremented on every `fail()`, even past
    /// the budget.
    pub retry_count: u32,
    /// Retry budget; `retry()` is blocked once `retry_count` reaches it.
    pub max_retries: u32,
    /// Scheduling priority in `0..=10`, higher first.
    pub priority: u8,
    /// When the task was created.
    pub created_at: DateTime<Utc>,
    /// When the task first started downloading; survives pause/resume.
    pub started_at: Option<DateTime<Utc>>,
    /// When the task was last paused; cleared on start/resume.
    pub paused_at: Option<DateTime<Utc>>,
    /// When the task completed.
    pub completed_at: Option<DateTime<Utc>>,
    /// When this snapshot was produced.
    pub updated_at: DateTime<Utc>,
}

impl TaskSnapshot {
    /// Creates a new pending task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::Validation`] if required fields are missing or
    /// the total size is zero.
    pub fn create(params: NewTask) -> Result<Self, TaskError> {
        params.validate()?;
        let now = Utc::now();

        Ok(Self {
            id: params.id,
            owner_id: params.owner_id,
            media_id: params.media_id,
            title: params.title,
            quality: params.quality,
            format: params.format,
            download_url: params.download_url,
            magnet_link: params.magnet_link,
            status: TaskStatus::Pending,
            progress: 0.0,
            downloaded_size: FileSize::zero(),
            total_size: params.total_size,
            speed: Speed::zero(),
            estimated_time_remaining: None,
            error_message: None,
            retry_count: 0,
            max_retries: DEFAULT_MAX_RETRIES,
            priority: params.priority.min(MAX_PRIORITY),
            created_at: now,
            started_at: None,
            paused_at: None,
            completed_at: None,
            updated_at: now,
        })
    }

    /// Guards a transition against the lifecycle table.
    fn transition_to(&self, next: TaskStatus) -> Result<(), TaskError> {
        if self.status.can_transition_to(next) {
            Ok(())
        } else {
            Err(TaskError::InvalidTransition {
                current: self.status,
                attempted: next,
            })
        }
    }

    /// Starts (or restarts after pause) the download.
    ///
    /// Sets `started_at` only the first time; a later pause/resume cycle
    /// keeps the original start time.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::InvalidTransition`] unless the task is `Pending`
    /// or `Paused`.
    pub fn start(&self) -> Result<Self, TaskError> {
        self.transition_to(TaskStatus::Downloading)?;
        let now = Utc::now();

        Ok(Self {
            status: TaskStatus::Downloading,
            started_at: self.started_at.or(Some(now)),
            paused_at: None,
            updated_at: now,
            ..self.clone()
        })
    }

    /// Pauses an in-flight download.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::InvalidTransition`] unless the task is
    /// `Downloading`.
    pub fn pause(&self) -> Result<Self, TaskError> {
        self.transition_to(TaskStatus::Paused)?;
        let now = Utc::now();

        Ok(Self {
            status: TaskStatus::Paused,
            paused_at: Some(now),
            updated_at: now,
            ..self.clone()
        })
    }

    /// Resumes a paused download.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::InvalidTransition`] unless the task is `Paused`.
    pub fn resume(&self) -> Result<Self, TaskError> {
        if !self.status.can_resume() {
            return Err(TaskError::InvalidTransition {
                current: self.status,
                attempted: TaskStatus::Downloading,
            });
        }

        Ok(Self {
            status: TaskStatus::Downloading,
            paused_at: None,
            updated_at: Utc::now(),
            ..self.clone()
        })
    }

    /// Cancels the task.
    ///
    /// Cancellation is a state transition, not an interrupt: telling the
    /// transfer engine to stop is the driver's job.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::InvalidTransition`] when the task is already
    /// `Completed`.
    pub fn cancel(&self) -> Result<Self, TaskError> {
        self.transition_to(TaskStatus::Cancelled)?;

        Ok(Self {
            status: TaskStatus::Cancelled,
            updated_at: Utc::now(),
            ..self.clone()
        })
    }

    /// Applies a progress report from the transfer engine.
    ///
    /// When the task is not `Downloading` the report is dropped and the same
    /// snapshot comes back unchanged; a late progress event racing a pause
    /// or cancel must not corrupt state. While downloading, `downloaded` is
    /// clamped to the total size and progress is recomputed to two decimals.
    #[must_use]
    pub fn update_progress(
        &self,
        downloaded: FileSize,
        speed: Speed,
        estimated_time_remaining: Option<u64>,
    ) -> Self {
        if self.status != TaskStatus::Downloading {
            return self.clone();
        }

        let downloaded = downloaded.min(self.total_size);
        let progress = if self.total_size.bytes() == 0 {
            0.0
        } else {
            let percent = downloaded.bytes() as f64 / self.total_size.bytes() as f64 * 100.0;
            round2(percent.min(100.0))
        };

        Self {
            progress,
            downloaded_size: downloaded,
            speed,
            estimated_time_remaining,
            updated_at: Utc::now(),
            ..self.clone()
        }
    }

    /// Completes the download and emits the history record.
    ///
    /// The snapshot is forced to `progress = 100` and
    /// `downloaded_size = total_size`. The history record carries the
    /// wall-clock duration since the first `start()` (zero if the task never
    /// started) and the average speed over that duration (zero when the
    /// duration is zero).
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::InvalidTransition`] unless the task is
    /// `Downloading`.
    pub fn complete(&self, download_path: &str) -> Result<(Self, HistoryRecord), TaskError> {
        self.transition_to(TaskStatus::Completed)?;
        let completed_at = Utc::now();

        let duration_ms = self
            .started_at
            .map(|started| (completed_at - started).num_milliseconds().max(0) as u64)
            .unwrap_or(0);

        let average_speed = if duration_ms > 0 {
            let bps = self.total_size.bytes() as f64 / duration_ms as f64 * 1000.0;
            Speed::from_bytes_per_second(bps as u64)
        } else {
            Speed::zero()
        };

        let snapshot = Self {
            status: TaskStatus::Completed,
            progress: 100.0,
            downloaded_size: self.total_size,
            completed_at: Some(completed_at),
            updated_at: completed_at,
            ..self.clone()
        };

        let history = HistoryRecord {
            id: self.id.clone(),
            owner_id: self.owner_id.clone(),
            media_id: self.media_id.clone(),
            title: self.title.clone(),
            quality: self.quality,
            format: self.format.clone(),
            file_size: self.total_size,
            download_path: download_path.to_string(),
            completed_at,
            download_duration_ms: duration_ms,
            average_speed,
        };

        Ok((snapshot, history))
    }

    /// Records a failed transfer attempt.
    ///
    /// Never errors: a failed attempt is an expected outcome, not an
    /// exceptional path. The retry count is incremented unconditionally,
    /// even past `max_retries` - the budget only gates `retry()`.
    #[must_use]
    pub fn fail(&self, message: &str) -> Self {
        Self {
            status: TaskStatus::Failed,
            error_message: Some(message.to_string()),
            retry_count: self.retry_count + 1,
            updated_at: Utc::now(),
            ..self.clone()
        }
    }

    /// Resets a failed task back to `Pending` for another attempt.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::InvalidTransition`] unless the task is `Failed`,
    /// or [`TaskError::RetryExhausted`] once the retry budget is spent.
    pub fn retry(&self) -> Result<Self, TaskError> {
        if !self.status.can_retry() {
            return Err(TaskError::InvalidTransition {
                current: self.status,
                attempted: TaskStatus::Pending,
            });
        }
        if self.retry_count >= self.max_retries {
            return Err(TaskError::RetryExhausted {
                retry_count: self.retry_count,
                max_retries: self.max_retries,
            });
        }

        Ok(Self {
            status: TaskStatus::Pending,
            error_message: None,
            updated_at: Utc::now(),
            ..self.clone()
        })
    }

    /// Sets the scheduling priority, clamping to `0..=10`. Always succeeds.
    #[must_use]
    pub fn set_priority(&self, priority: i64) -> Self {
        Self {
            priority: priority.clamp(0, i64::from(MAX_PRIORITY)) as u8,
            updated_at: Utc::now(),
            ..self.clone()
        }
    }

    /// True when the task counts against the concurrency ceiling.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// True when `retry()` would currently be accepted.
    #[must_use]
    pub fn can_retry(&self) -> bool {
        self.status.can_retry() && self.retry_count < self.max_retries
    }

    /// Renders the remaining-time estimate as short English text,
    /// e.g. `"2h 5m"`, `"3m 20s"` or `"45s"`.
    ///
    /// Returns `"unknown"` when no estimate is available.
    #[must_use]
    pub fn eta_text(&self) -> String {
        match self.estimated_time_remaining {
            None | Some(0) => "unknown".to_string(),
            Some(ms) => {
                let seconds = ms / 1000;
                let minutes = seconds / 60;
                let hours = minutes / 60;

                if hours > 0 {
                    format!("{hours}h {}m", minutes % 60)
                } else if minutes > 0 {
                    format!("{minutes}m {}s", seconds % 60)
                } else {
                    format!("{seconds}s")
                }
            }
        }
    }
}
