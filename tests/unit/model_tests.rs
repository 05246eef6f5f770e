//! Unit tests for domain model constructors and storage strings.

use session_warden::models::checkpoint::{
    CheckpointType, MetricsSnapshot, NewCheckpoint, SessionSnapshot,
};
use session_warden::models::pause::{InterventionAction, PausedSession, PauseType};
use session_warden::models::recovery::{CheckpointRecovery, RecoveryMethod, RecoveryStatus};

#[test]
fn new_pause_record_starts_unresolved() {
    let record = PausedSession::new(
        "sess-1".into(),
        "proj-1".into(),
        "consecutive retry limit exceeded".into(),
        PauseType::RetryLimit,
        Some("task-7".into()),
    );

    assert!(!record.id.is_empty());
    assert!(!record.resolved);
    assert!(record.resolved_at.is_none());
    assert!(record.resolved_by.is_none());
    assert_eq!(record.pause_type, PauseType::RetryLimit);
}

#[test]
fn new_action_carries_payload() {
    let action = InterventionAction::new(
        "pause-1".into(),
        "notify".into(),
        Some(serde_json::json!({ "channel": "C123" })),
    );

    assert_eq!(action.paused_session_id, "pause-1");
    assert_eq!(action.action_type, "notify");
    assert_eq!(
        action.payload.as_ref().and_then(|p| p["channel"].as_str()),
        Some("C123")
    );
}

#[test]
fn checkpoint_materializes_with_assigned_sequence() {
    let new = NewCheckpoint {
        session_id: "sess-1".into(),
        project_id: "proj-1".into(),
        checkpoint_type: CheckpointType::Periodic,
        snapshot: serde_json::json!({ "conversation": [], "agent_state": {} }),
        current_task_ref: None,
        completed_tasks: vec!["task-1".into()],
        metrics: MetricsSnapshot::default(),
    };

    let checkpoint = new.into_checkpoint(4);
    assert_eq!(checkpoint.sequence, 4);
    assert!(checkpoint.valid);
    assert_eq!(checkpoint.checkpoint_type, CheckpointType::Periodic);
    assert_eq!(checkpoint.completed_tasks, vec!["task-1"]);
}

#[test]
fn new_recovery_starts_in_progress() {
    let recovery = CheckpointRecovery::new("cp-1".into(), RecoveryMethod::Automatic);

    assert_eq!(recovery.status, RecoveryStatus::InProgress);
    assert!(recovery.completed_at.is_none());
    assert!(recovery.duration_ms.is_none());
    assert!(recovery.failure_cause.is_none());
}

#[test]
fn storage_strings_are_stable() {
    assert_eq!(PauseType::RetryLimit.as_str(), "retry_limit");
    assert_eq!(PauseType::ErrorThreshold.as_str(), "error_threshold");
    assert_eq!(PauseType::BlockedTool.as_str(), "blocked_tool");
    assert_eq!(PauseType::Manual.as_str(), "manual");

    assert_eq!(CheckpointType::TaskCompletion.as_str(), "task_completion");
    assert_eq!(CheckpointType::Periodic.as_str(), "periodic");
    assert_eq!(CheckpointType::Manual.as_str(), "manual");

    assert_eq!(RecoveryMethod::Manual.as_str(), "manual");
    assert_eq!(RecoveryMethod::Automatic.as_str(), "automatic");
    assert_eq!(RecoveryStatus::InProgress.as_str(), "in_progress");
    assert_eq!(RecoveryStatus::Succeeded.as_str(), "succeeded");
    assert_eq!(RecoveryStatus::Failed.as_str(), "failed");
}

#[test]
fn session_snapshot_serde_round_trips() {
    let snapshot = SessionSnapshot {
        conversation: vec![serde_json::json!({ "role": "user", "content": "hi" })],
        agent_state: serde_json::json!({ "step": 3 }),
    };

    let value = serde_json::to_value(&snapshot).expect("serialize");
    let back: SessionSnapshot = serde_json::from_value(value).expect("deserialize");
    assert_eq!(back, snapshot);
}
