//! Media Download Core Library
//!
//! This library provides the lifecycle and scheduling core for a media
//! download manager: an immutable task entity with a guarded state
//! machine, pure scheduling decisions (concurrency, ordering, priority,
//! retry pacing), quota/permission gating, and SQLite persistence.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`task`] - Task entity, lifecycle state machine, history records
//! - [`scheduler`] - Pure scheduling, priority, permission, and stats functions
//! - [`measure`] - Byte-exact size and speed value types
//! - [`store`] - SQLite-backed persistence for snapshots and history
//!
//! Every lifecycle operation returns a fresh snapshot rather than
//! mutating in place; drivers load a snapshot, apply an operation, and
//! persist the replacement.

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod measure;
pub mod scheduler;
pub mod store;
pub mod task;

// Re-export commonly used types
pub use measure::{FileSize, MeasureError, Speed};
pub use scheduler::{
    DEFAULT_MAX_CONCURRENT, DownloadStats, MediaMetadata, Permission, PermissionError,
    UserPreferences, calculate_download_stats, calculate_priority, calculate_remaining_time,
    can_start_download, estimate_download_time, next_download_task, recommended_quality,
    retry_delay, should_retry, validate_download_permission,
};
pub use store::{Database, StoreError, TaskStore};
pub use task::{
    DEFAULT_MAX_RETRIES, DEFAULT_PRIORITY, HistoryRecord, NewTask, Quality, TaskError,
    TaskSnapshot, TaskStatus,
};
