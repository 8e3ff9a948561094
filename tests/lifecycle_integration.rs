//! Integration tests for the task lifecycle and scheduler.
//!
//! These tests drive full lifecycle flows through the public API: create a
//! task, move it through the state machine, and check what the scheduler
//! decides at each point.

use mediadl_core::{
    DEFAULT_MAX_RETRIES, FileSize, NewTask, Permission, PermissionError, Quality, Speed, TaskError,
    TaskSnapshot, TaskStatus, calculate_download_stats, can_start_download, next_download_task,
    retry_delay, should_retry, validate_download_permission,
};

fn new_task(id: &str, priority: u8, total_bytes: u64) -> TaskSnapshot {
    TaskSnapshot::create(NewTask {
        id: id.to_string(),
        owner_id: "user-1".to_string(),
        media_id: format!("movie-{id}"),
        title: format!("Movie {id}"),
        quality: Quality::Hd,
        format: "mkv".to_string(),
        download_url: format!("https://cdn.example.com/{id}.mkv"),
        magnet_link: None,
        total_size: FileSize::from_bytes(total_bytes),
        priority,
    })
    .expect("Failed to create task")
}

// ==================== Happy Path ====================

#[test]
fn test_full_download_lifecycle() {
    let task = new_task("t-1", 5, 1000);
    assert_eq!(task.status, TaskStatus::Pending);
    assert_eq!(task.progress, 0.0);
    assert!(task.started_at.is_none());

    let task = task.start().expect("Failed to start");
    assert_eq!(task.status, TaskStatus::Downloading);
    assert!(task.started_at.is_some());

    let task = task.update_progress(
        FileSize::from_bytes(500),
        Speed::from_bytes_per_second(100),
        Some(5000),
    );
    assert_eq!(task.progress, 50.0);
    assert_eq!(task.downloaded_size.bytes(), 500);
    assert_eq!(task.speed.bytes_per_second(), 100);

    let (task, history) = task.complete("/downloads/t-1.mkv").expect("Failed to complete");
    assert_eq!(task.status, TaskStatus::Completed);
    assert_eq!(task.progress, 100.0);
    assert_eq!(task.downloaded_size, task.total_size);
    assert!(task.completed_at.is_some());

    assert_eq!(history.id, "t-1");
    assert_eq!(history.owner_id, "user-1");
    assert_eq!(history.file_size.bytes(), 1000);
    assert_eq!(history.download_path, "/downloads/t-1.mkv");
}

#[test]
fn test_pause_and_resume_round_trip() {
    let task = new_task("t-1", 5, 1000).start().expect("start").update_progress(
        FileSize::from_bytes(250),
        Speed::from_bytes_per_second(100),
        None,
    );

    let paused = task.pause().expect("pause");
    assert_eq!(paused.status, TaskStatus::Paused);
    assert!(paused.paused_at.is_some());
    // Pausing freezes the counters; the last reported speed stays visible
    assert_eq!(paused.speed.bytes_per_second(), 100);
    assert_eq!(paused.downloaded_size.bytes(), 250);

    let resumed = paused.resume().expect("resume");
    assert_eq!(resumed.status, TaskStatus::Downloading);
    assert!(resumed.paused_at.is_none());
    // started_at is set once and survives the pause
    assert_eq!(resumed.started_at, task.started_at);
}

// ==================== Guarded Transitions ====================

#[test]
fn test_cannot_restart_completed_task() {
    let (done, _) = new_task("t-1", 5, 1000)
        .start()
        .expect("start")
        .complete("/downloads/t-1.mkv")
        .expect("complete");

    let err = done.start().expect_err("completed task must not restart");
    assert!(matches!(err, TaskError::InvalidTransition { .. }));
    assert!(err.to_string().contains("completed -> downloading"));
}

#[test]
fn test_cancel_allowed_from_every_state_except_completed() {
    assert!(new_task("a", 5, 1000).cancel().is_ok());
    assert!(new_task("b", 5, 1000).start().expect("start").cancel().is_ok());
    assert!(new_task("c", 5, 1000).fail("boom").cancel().is_ok());

    let (done, _) = new_task("d", 5, 1000)
        .start()
        .expect("start")
        .complete("/tmp/d.mkv")
        .expect("complete");
    assert!(done.cancel().is_err());
}

#[test]
fn test_progress_updates_ignored_outside_downloading() {
    let paused = new_task("t-1", 5, 1000)
        .start()
        .expect("start")
        .pause()
        .expect("pause");

    let after = paused.update_progress(
        FileSize::from_bytes(900),
        Speed::from_bytes_per_second(100),
        None,
    );
    assert_eq!(after.progress, paused.progress);
    assert_eq!(after.downloaded_size, paused.downloaded_size);
}

// ==================== Retry Flow ====================

#[test]
fn test_fail_and_retry_until_exhausted() {
    let mut task = new_task("t-1", 5, 1000).start().expect("start");

    for attempt in 1..=DEFAULT_MAX_RETRIES {
        task = task.fail("connection reset");
        assert_eq!(task.status, TaskStatus::Failed);
        assert_eq!(task.retry_count, attempt);
        assert_eq!(task.error_message.as_deref(), Some("connection reset"));

        if attempt < DEFAULT_MAX_RETRIES {
            assert!(should_retry(&task, DEFAULT_MAX_RETRIES));
            task = task.retry().expect("retry").start().expect("start");
        }
    }

    assert!(!should_retry(&task, DEFAULT_MAX_RETRIES));
    let err = task.retry().expect_err("retry budget is spent");
    assert!(matches!(
        err,
        TaskError::RetryExhausted {
            retry_count: 3,
            max_retries: 3
        }
    ));
}

#[test]
fn test_retry_clears_error_and_returns_to_pending() {
    let failed = new_task("t-1", 5, 1000).start().expect("start").fail("timeout");
    let retried = failed.retry().expect("retry");

    assert_eq!(retried.status, TaskStatus::Pending);
    assert!(retried.error_message.is_none());
    // The attempt counter is spent, not reset
    assert_eq!(retried.retry_count, 1);
}

#[test]
fn test_retry_delay_escalation() {
    let delays: Vec<u64> = (0..6).map(|n| retry_delay(n).as_millis() as u64).collect();
    assert_eq!(delays, vec![1000, 3000, 5000, 10_000, 10_000, 10_000]);
}

// ==================== Scheduling ====================

#[test]
fn test_scheduler_dispatch_order_and_ceiling() {
    let urgent = new_task("t-urgent", 9, 1000);
    let normal = new_task("t-normal", 5, 1000);
    let lazy = new_task("t-lazy", 1, 1000);

    let queue = vec![lazy.clone(), normal.clone(), urgent.clone()];
    let next = next_download_task(&queue).expect("a pending task exists");
    assert_eq!(next.id, "t-urgent");

    // Start the urgent one; the queue still holds three active tasks
    // (one downloading, two pending), so the ceiling of three is hit.
    let queue = vec![lazy, normal, urgent.start().expect("start")];
    assert!(!can_start_download(&queue));

    let next = next_download_task(&queue).expect("pending tasks remain");
    assert_eq!(next.id, "t-normal");
}

#[test]
fn test_stats_over_mixed_queue() {
    let half = new_task("a", 5, 1000).start().expect("start").update_progress(
        FileSize::from_bytes(500),
        Speed::from_bytes_per_second(100),
        None,
    );
    let (done, _) = new_task("b", 5, 2000)
        .start()
        .expect("start")
        .complete("/tmp/b.mkv")
        .expect("complete");
    let idle = new_task("c", 5, 3000);

    let stats = calculate_download_stats(&[half, done, idle]);
    assert_eq!(stats.total, 3);
    assert_eq!(stats.downloading, 1);
    assert_eq!(stats.completed, 1);
    assert_eq!(stats.pending, 1);
    assert_eq!(stats.total_size.bytes(), 6000);
    assert_eq!(stats.downloaded_size.bytes(), 2500);
    assert_eq!(stats.average_speed.bytes_per_second(), 100);
}

// ==================== Permission Gating ====================

#[test]
fn test_permission_gate_short_circuits_in_order() {
    let none: &[Permission] = &[];
    assert!(matches!(
        validate_download_permission(Quality::Uhd, none),
        Err(PermissionError::BasicRequired)
    ));

    let basic = &[Permission::DownloadBasic];
    assert!(validate_download_permission(Quality::Sd, basic).is_ok());
    assert!(matches!(
        validate_download_permission(Quality::Hd, basic),
        Err(PermissionError::HdRequired)
    ));

    let premium = &[Permission::DownloadBasic, Permission::DownloadHd];
    assert!(validate_download_permission(Quality::Hd, premium).is_ok());
    assert!(matches!(
        validate_download_permission(Quality::Uhd, premium),
        Err(PermissionError::UhdRequired)
    ));
}
