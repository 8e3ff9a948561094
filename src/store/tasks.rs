//! Repository for task snapshots and history records.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use tracing::instrument;

use crate::measure::{FileSize, Speed};
use crate::task::{HistoryRecord, Quality, TaskSnapshot, TaskStatus};

use super::{Database, Result, StoreError};

/// Returns `Ok(())` if at least one row was affected; otherwise
/// [`StoreError::TaskNotFound`].
fn check_affected(id: &str, rows_affected: u64) -> Result<()> {
    if rows_affected == 0 {
        Err(StoreError::TaskNotFound(id.to_string()))
    } else {
        Ok(())
    }
}

/// Raw `tasks` row; converted to [`TaskSnapshot`] after fetching.
#[derive(Debug, FromRow)]
struct TaskRow {
    id: String,
    owner_id: String,
    media_id: String,
    title: String,
    quality: String,
    format: String,
    download_url: String,
    magnet_link: Option<String>,
    status: String,
    progress: f64,
    downloaded_size: i64,
    total_size: i64,
    speed: i64,
    estimated_time_remaining: Option<i64>,
    error_message: Option<String>,
    retry_count: i64,
    max_retries: i64,
    priority: i64,
    created_at: DateTime<Utc>,
    started_at: Option<DateTime<Utc>>,
    paused_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    updated_at: DateTime<Utc>,
}

impl From<TaskRow> for TaskSnapshot {
    fn from(row: TaskRow) -> Self {
        Self {
            id: row.id,
            owner_id: row.owner_id,
            media_id: row.media_id,
            title: row.title,
            // CHECK constraints keep these parseable; fall back to the
            // lowest tier / initial state on a hand-edited database
            quality: row.quality.parse().unwrap_or(Quality::Sd),
            status: row.status.parse().unwrap_or(TaskStatus::Pending),
            format: row.format,
            download_url: row.download_url,
            magnet_link: row.magnet_link,
            progress: row.progress,
            downloaded_size: FileSize::from_bytes(row.downloaded_size.max(0) as u64),
            total_size: FileSize::from_bytes(row.total_size.max(0) as u64),
            speed: Speed::from_bytes_per_second(row.speed.max(0) as u64),
            estimated_time_remaining: row.estimated_time_remaining.map(|ms| ms.max(0) as u64),
            error_message: row.error_message,
            retry_count: row.retry_count.max(0) as u32,
            max_retries: row.max_retries.max(0) as u32,
            priority: row.priority.clamp(0, 10) as u8,
            created_at: row.created_at,
            started_at: row.started_at,
            paused_at: row.paused_at,
            completed_at: row.completed_at,
            updated_at: row.updated_at,
        }
    }
}

/// Raw `download_history` row.
#[derive(Debug, FromRow)]
struct HistoryRow {
    id: String,
    owner_id: String,
    media_id: String,
    title: String,
    quality: String,
    format: String,
    file_size: i64,
    download_path: String,
    completed_at: DateTime<Utc>,
    download_duration_ms: i64,
    average_speed: i64,
}

impl From<HistoryRow> for HistoryRecord {
    fn from(row: HistoryRow) -> Self {
        Self {
            id: row.id,
            owner_id: row.owner_id,
            media_id: row.media_id,
            title: row.title,
            quality: row.quality.parse().unwrap_or(Quality::Sd),
            format: row.format,
            file_size: FileSize::from_bytes(row.file_size.max(0) as u64),
            download_path: row.download_path,
            completed_at: row.completed_at,
            download_duration_ms: row.download_duration_ms.max(0) as u64,
            average_speed: Speed::from_bytes_per_second(row.average_speed.max(0) as u64),
        }
    }
}

/// SQLite-backed repository for task snapshots and history records.
///
/// `save` replaces the whole row with the given snapshot; the entity's
/// replace-not-mutate semantics carry through to storage. History rows are
/// insert-only and share the task's id.
#[derive(Debug, Clone)]
pub struct TaskStore {
    db: Database,
}

impl TaskStore {
    /// Creates a new store over the given database connection.
    #[must_use]
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Persists a snapshot, replacing any previous row with the same id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the write fails.
    #[instrument(skip(self, task), fields(id = %task.id, status = %task.status))]
    pub async fn save(&self, task: &TaskSnapshot) -> Result<()> {
        sqlx::query(
            r"INSERT OR REPLACE INTO tasks (
                id, owner_id, media_id, title, quality, format,
                download_url, magnet_link, status, progress,
                downloaded_size, total_size, speed, estimated_time_remaining,
                error_message, retry_count, max_retries, priority,
                created_at, started_at, paused_at, completed_at, updated_at
              )
              VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&task.id)
        .bind(&task.owner_id)
        .bind(&task.media_id)
        .bind(&task.title)
        .bind(task.quality.as_str())
        .bind(&task.format)
        .bind(&task.download_url)
        .bind(&task.magnet_link)
        .bind(task.status.as_str())
        .bind(task.progress)
        .bind(task.downloaded_size.bytes() as i64)
        .bind(task.total_size.bytes() as i64)
        .bind(task.speed.bytes_per_second() as i64)
        .bind(task.estimated_time_remaining.map(|ms| ms as i64))
        .bind(&task.error_message)
        .bind(i64::from(task.retry_count))
        .bind(i64::from(task.max_retries))
        .bind(i64::from(task.priority))
        .bind(task.created_at)
        .bind(task.started_at)
        .bind(task.paused_at)
        .bind(task.completed_at)
        .bind(task.updated_at)
        .execute(self.db.pool())
        .await?;

        Ok(())
    }

    /// Loads a snapshot by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the query fails.
    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<Option<TaskSnapshot>> {
        let row = sqlx::query_as::<_, TaskRow>("SELECT * FROM tasks WHERE id = ?")
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(row.map(TaskSnapshot::from))
    }

    /// Deletes a task row.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::TaskNotFound`] if no row exists with the given
    /// id, or [`StoreError::Database`] if the delete fails.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;

        check_affected(id, result.rows_affected())
    }

    /// Returns all tasks belonging to an owner, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the query fails.
    #[instrument(skip(self))]
    pub async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<TaskSnapshot>> {
        let rows = sqlx::query_as::<_, TaskRow>(
            "SELECT * FROM tasks WHERE owner_id = ? ORDER BY created_at ASC, id ASC",
        )
        .bind(owner_id)
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows.into_iter().map(TaskSnapshot::from).collect())
    }

    /// Returns all tasks in a lifecycle state, in dispatch order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the query fails.
    #[instrument(skip(self))]
    pub async fn list_by_status(&self, status: TaskStatus) -> Result<Vec<TaskSnapshot>> {
        let rows = sqlx::query_as::<_, TaskRow>(
            "SELECT * FROM tasks WHERE status = ?
             ORDER BY priority DESC, created_at ASC, id ASC",
        )
        .bind(status.as_str())
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows.into_iter().map(TaskSnapshot::from).collect())
    }

    /// Returns the count of tasks in a lifecycle state.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the query fails.
    #[instrument(skip(self))]
    pub async fn count_by_status(&self, status: TaskStatus) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tasks WHERE status = ?")
            .bind(status.as_str())
            .fetch_one(self.db.pool())
            .await?;

        Ok(count)
    }

    /// Persists a history record. Insert-only: a second record with the
    /// same id is a constraint violation.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the insert fails.
    #[instrument(skip(self, record), fields(id = %record.id))]
    pub async fn record_history(&self, record: &HistoryRecord) -> Result<()> {
        sqlx::query(
            r"INSERT INTO download_history (
                id, owner_id, media_id, title, quality, format,
                file_size, download_path, completed_at,
                download_duration_ms, average_speed
              )
              VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.id)
        .bind(&record.owner_id)
        .bind(&record.media_id)
        .bind(&record.title)
        .bind(record.quality.as_str())
        .bind(&record.format)
        .bind(record.file_size.bytes() as i64)
        .bind(&record.download_path)
        .bind(record.completed_at)
        .bind(record.download_duration_ms as i64)
        .bind(record.average_speed.bytes_per_second() as i64)
        .execute(self.db.pool())
        .await?;

        Ok(())
    }

    /// Returns an owner's history, most recent completion first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the query fails.
    #[instrument(skip(self))]
    pub async fn history_for_owner(&self, owner_id: &str) -> Result<Vec<HistoryRecord>> {
        let rows = sqlx::query_as::<_, HistoryRow>(
            "SELECT * FROM download_history WHERE owner_id = ? ORDER BY completed_at DESC",
        )
        .bind(owner_id)
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows.into_iter().map(HistoryRecord::from).collect())
    }
}
