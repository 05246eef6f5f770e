//! Recovery lifecycle models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::checkpoint::{MetricsSnapshot, SessionSnapshot};

/// How a recovery was initiated.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryMethod {
    /// Operator-driven restore.
    Manual,
    /// Restart-time automatic restore.
    Automatic,
}

impl RecoveryMethod {
    /// Stable storage string for the enum.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Automatic => "automatic",
        }
    }
}

/// Lifecycle status of a recovery attempt.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryStatus {
    /// Recovery started, not yet finished.
    InProgress,
    /// Session state restored successfully.
    Succeeded,
    /// Restore failed; cause preserved for operator inspection.
    Failed,
}

impl RecoveryStatus {
    /// Stable storage string for the enum.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InProgress => "in_progress",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }
}

/// One tracked attempt to restore a session from a fixed checkpoint.
///
/// Created `in_progress`, transitions exactly once to `succeeded` or
/// `failed`, immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct CheckpointRecovery {
    /// Unique record identifier.
    pub id: String,
    /// Target checkpoint, decided up front and never retargeted.
    pub checkpoint_id: String,
    /// How the recovery was initiated.
    pub method: RecoveryMethod,
    /// Start timestamp.
    pub started_at: DateTime<Utc>,
    /// Completion timestamp, set on the terminal transition.
    pub completed_at: Option<DateTime<Utc>>,
    /// Current lifecycle status.
    pub status: RecoveryStatus,
    /// Derived duration in milliseconds, set on completion.
    pub duration_ms: Option<i64>,
    /// Underlying cause for failed recoveries.
    pub failure_cause: Option<String>,
}

impl CheckpointRecovery {
    /// Construct a new in-progress recovery for a checkpoint.
    #[must_use]
    pub fn new(checkpoint_id: String, method: RecoveryMethod) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            checkpoint_id,
            method,
            started_at: Utc::now(),
            completed_at: None,
            status: RecoveryStatus::InProgress,
            duration_ms: None,
            failure_cause: None,
        }
    }
}

/// In-memory session state reconstructed from a checkpoint snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct RestoredState {
    /// Source checkpoint identifier.
    pub checkpoint_id: String,
    /// Source checkpoint sequence number.
    pub sequence: i64,
    /// Parsed conversation/state snapshot.
    pub snapshot: SessionSnapshot,
    /// Task the session was on at checkpoint time.
    pub current_task_ref: Option<String>,
    /// Tasks completed before the checkpoint.
    pub completed_tasks: Vec<String>,
    /// Metrics at checkpoint time.
    pub metrics: MetricsSnapshot,
}
