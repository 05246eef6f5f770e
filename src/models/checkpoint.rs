//! Checkpoint model for durable session state snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Caller-chosen label for why a checkpoint was taken.
///
/// Labels only — cadence decisions belong to the agent loop.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CheckpointType {
    /// Taken after a unit of work completed.
    TaskCompletion,
    /// Taken on a timer.
    Periodic,
    /// Requested explicitly.
    Manual,
}

impl CheckpointType {
    /// Stable storage string for the enum.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TaskCompletion => "task_completion",
            Self::Periodic => "periodic",
            Self::Manual => "manual",
        }
    }
}

/// Metrics captured alongside a checkpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct MetricsSnapshot {
    /// Units of work completed so far.
    pub tasks_completed: u64,
    /// Errors observed so far.
    pub error_count: u64,
    /// Retries burned so far.
    pub retry_count: u64,
    /// Wall-clock seconds since the session started.
    pub elapsed_seconds: u64,
}

/// The serialized conversation/state payload stored in a checkpoint.
///
/// Full snapshot each time; deltas are an optimization this layer does not
/// attempt.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct SessionSnapshot {
    /// Conversation history entries, verbatim.
    pub conversation: Vec<serde_json::Value>,
    /// Opaque agent-loop state.
    pub agent_state: serde_json::Value,
}

/// A durable snapshot of session state sufficient to resume work.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct SessionCheckpoint {
    /// Unique record identifier.
    pub id: String,
    /// Owning session identifier.
    pub session_id: String,
    /// Owning project identifier.
    pub project_id: String,
    /// Why the checkpoint was taken.
    pub checkpoint_type: CheckpointType,
    /// Strictly increasing per session, starting at 1.
    pub sequence: i64,
    /// Serialized conversation/state snapshot.
    pub snapshot: serde_json::Value,
    /// Reference to the task in flight at checkpoint time.
    pub current_task_ref: Option<String>,
    /// Identifiers of tasks completed so far.
    pub completed_tasks: Vec<String>,
    /// Metrics at checkpoint time.
    pub metrics: MetricsSnapshot,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Whether this checkpoint may still be offered for recovery.
    pub valid: bool,
}

/// Parameters for creating a checkpoint; the sequence number is assigned
/// by the store transaction, not the caller.
#[derive(Debug, Clone)]
pub struct NewCheckpoint {
    /// Owning session identifier.
    pub session_id: String,
    /// Owning project identifier.
    pub project_id: String,
    /// Why the checkpoint is being taken.
    pub checkpoint_type: CheckpointType,
    /// Serialized conversation/state snapshot.
    pub snapshot: serde_json::Value,
    /// Reference to the task in flight.
    pub current_task_ref: Option<String>,
    /// Identifiers of tasks completed so far.
    pub completed_tasks: Vec<String>,
    /// Metrics at checkpoint time.
    pub metrics: MetricsSnapshot,
}

impl NewCheckpoint {
    /// Materialize the record with a fresh id, timestamp, and the assigned
    /// sequence number.
    #[must_use]
    pub fn into_checkpoint(self, sequence: i64) -> SessionCheckpoint {
        SessionCheckpoint {
            id: Uuid::new_v4().to_string(),
            session_id: self.session_id,
            project_id: self.project_id,
            checkpoint_type: self.checkpoint_type,
            sequence,
            snapshot: self.snapshot,
            current_task_ref: self.current_task_ref,
            completed_tasks: self.completed_tasks,
            metrics: self.metrics,
            created_at: Utc::now(),
            valid: true,
        }
    }
}
