//! Aggregate statistics over a task collection.

use serde::Serialize;

use crate::measure::{FileSize, Speed};
use crate::task::{TaskSnapshot, TaskStatus};

/// Aggregate view of a set of download tasks.
///
/// Sizes cover every task in the collection (cancelled included); the
/// per-status counters cover the five non-cancelled lifecycle buckets the
/// UI reports on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DownloadStats {
    /// Total number of tasks.
    pub total: usize,
    /// Completed tasks.
    pub completed: usize,
    /// Failed tasks.
    pub failed: usize,
    /// Tasks currently downloading.
    pub downloading: usize,
    /// Tasks waiting to start.
    pub pending: usize,
    /// Paused tasks.
    pub paused: usize,
    /// Sum of expected total sizes.
    pub total_size: FileSize,
    /// Sum of received bytes, derived from each task's progress.
    pub downloaded_size: FileSize,
    /// Mean speed of the tasks currently downloading; zero when none are.
    pub average_speed: Speed,
}

/// Computes aggregate statistics for `tasks`.
///
/// `downloaded_size` is derived as `total_size * progress / 100` per task
/// (floored to whole bytes), so it stays consistent with reported progress
/// rather than raw byte counters.
#[must_use]
pub fn calculate_download_stats(tasks: &[TaskSnapshot]) -> DownloadStats {
    let mut stats = DownloadStats {
        total: tasks.len(),
        ..DownloadStats::default()
    };

    let mut downloaded_bytes = 0.0_f64;
    let mut speed_sum: u64 = 0;

    for task in tasks {
        stats.total_size = stats.total_size.add(task.total_size);
        downloaded_bytes += task.total_size.bytes() as f64 * task.progress / 100.0;

        match task.status {
            TaskStatus::Completed => stats.completed += 1,
            TaskStatus::Failed => stats.failed += 1,
            TaskStatus::Downloading => {
                stats.downloading += 1;
                speed_sum = speed_sum.saturating_add(task.speed.bytes_per_second());
            }
            TaskStatus::Pending => stats.pending += 1,
            TaskStatus::Paused => stats.paused += 1,
            TaskStatus::Cancelled => {}
        }
    }

    stats.downloaded_size = FileSize::from_bytes(downloaded_bytes as u64);
    if stats.downloading > 0 {
        stats.average_speed = Speed::from_bytes_per_second(speed_sum / stats.downloading as u64);
    }

    stats
}
