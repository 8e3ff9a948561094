//! Stateless scheduling queries over collections of task snapshots.
//!
//! The scheduler owns no state and takes no locks: every function here is a
//! pure query over a slice of [`TaskSnapshot`]s. The task registry itself
//! belongs to the driver, which must serialize reads and writes around these
//! calls - two drivers that both observe spare capacity would both dispatch
//! and overshoot the concurrency ceiling.
//!
//! Provided queries:
//! - [`can_start_download`] - concurrency ceiling check
//! - [`next_download_task`] - priority-ordered candidate selection
//! - [`calculate_priority`] - priority scoring from catalog metadata
//! - [`retry_delay`] / [`should_retry`] - retry policy
//! - [`estimate_download_time`] / [`calculate_remaining_time`] - time math
//! - [`calculate_download_stats`] - aggregate statistics
//! - [`validate_download_permission`] / [`recommended_quality`] - gating

mod permission;
mod priority;
mod stats;

pub use permission::{Permission, PermissionError, recommended_quality, validate_download_permission};
pub use priority::{MediaMetadata, UserPreferences, calculate_priority};
pub use stats::{DownloadStats, calculate_download_stats};

use std::time::Duration;

use tracing::debug;

use crate::measure::{FileSize, Speed};
use crate::task::{TaskSnapshot, TaskStatus};

/// Maximum number of tasks that may be active at once.
pub const DEFAULT_MAX_CONCURRENT: usize = 3;

/// Fixed retry-delay escalation table, indexed by retry count.
///
/// Deliberately a fixed table rather than exponential backoff; counts past
/// the end reuse the last entry.
const RETRY_DELAYS_MS: [u64; 4] = [1000, 3000, 5000, 10_000];

/// Returns true when another download may start under the default
/// concurrency ceiling of 3.
///
/// Both `Downloading` and `Pending` tasks count as active: a pending task
/// has been admitted to the queue and will consume a slot as soon as the
/// driver dispatches it.
#[must_use]
pub fn can_start_download(tasks: &[TaskSnapshot]) -> bool {
    can_start_download_with_limit(tasks, DEFAULT_MAX_CONCURRENT)
}

/// [`can_start_download`] with an explicit concurrency ceiling.
#[must_use]
pub fn can_start_download_with_limit(tasks: &[TaskSnapshot], limit: usize) -> bool {
    let active = tasks.iter().filter(|task| task.is_active()).count();
    debug!(active, limit, "concurrency check");
    active < limit
}

/// Picks the pending task that should start next.
///
/// Orders by priority descending, then `created_at` ascending (oldest
/// first), then task id ascending. The id tie-break makes selection
/// deterministic when two tasks share a creation timestamp.
#[must_use]
pub fn next_download_task(tasks: &[TaskSnapshot]) -> Option<&TaskSnapshot> {
    tasks
        .iter()
        .filter(|task| task.status == TaskStatus::Pending)
        .min_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| a.created_at.cmp(&b.created_at))
                .then_with(|| a.id.cmp(&b.id))
        })
}

/// Returns the delay to wait before the next retry attempt.
///
/// Indexes the fixed escalation table; counts past the table reuse the
/// final 10-second entry.
#[must_use]
pub fn retry_delay(retry_count: u32) -> Duration {
    let index = (retry_count as usize).min(RETRY_DELAYS_MS.len() - 1);
    Duration::from_millis(RETRY_DELAYS_MS[index])
}

/// Returns true when a failed task still has retry budget left.
#[must_use]
pub fn should_retry(task: &TaskSnapshot, max_retries: u32) -> bool {
    task.status == TaskStatus::Failed && task.retry_count < max_retries
}

/// Estimates the total transfer time for `size` at `average_speed`, in
/// whole seconds (rounded up). Returns 0 when the rate is zero.
#[must_use]
pub fn estimate_download_time(size: FileSize, average_speed: Speed) -> u64 {
    let bps = average_speed.bytes_per_second();
    if bps == 0 {
        return 0;
    }
    size.bytes().div_ceil(bps)
}

/// Estimates the time left to finish a partially downloaded file, in whole
/// seconds (rounded up).
///
/// Returns 0 when the rate is zero or the download has already received
/// everything.
#[must_use]
pub fn calculate_remaining_time(size: FileSize, downloaded: FileSize, speed: Speed) -> u64 {
    let bps = speed.bytes_per_second();
    if bps == 0 || downloaded >= size {
        return 0;
    }
    size.subtract(downloaded).bytes().div_ceil(bps)
}
