//! Immutable ledger entry written once, when a download completes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::measure::{FileSize, Speed};

use super::Quality;

/// Record of one completed download.
///
/// Produced exactly once by [`TaskSnapshot::complete`](super::TaskSnapshot::complete)
/// and never mutated afterwards. Shares its `id` with the task it came from
/// but holds no back-pointer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Same id as the originating task.
    pub id: String,
    /// Owner of the originating task.
    pub owner_id: String,
    /// Media item that was downloaded.
    pub media_id: String,
    /// Media title at completion time.
    pub title: String,
    /// Quality tier that was downloaded.
    pub quality: Quality,
    /// Container format that was downloaded.
    pub format: String,
    /// Final file size (the task's total size).
    pub file_size: FileSize,
    /// Path reported by the transfer engine.
    pub download_path: String,
    /// When the download finished.
    pub completed_at: DateTime<Utc>,
    /// Wall-clock duration from first start to completion, in milliseconds.
    /// Zero when the task was completed without ever starting.
    pub download_duration_ms: u64,
    /// Mean transfer rate over the whole download; zero when the duration
    /// is zero.
    pub average_speed: Speed,
}
