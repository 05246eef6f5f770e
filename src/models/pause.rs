//! Pause registry models: paused-session records and intervention actions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Why a session was blocked.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PauseType {
    /// Consecutive-retry limit exceeded.
    RetryLimit,
    /// Error-rate threshold exceeded.
    ErrorThreshold,
    /// A disallowed action was attempted.
    BlockedTool,
    /// Manual block flag set by an operator.
    Manual,
}

impl PauseType {
    /// Stable storage string for the enum.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RetryLimit => "retry_limit",
            Self::ErrorThreshold => "error_threshold",
            Self::BlockedTool => "blocked_tool",
            Self::Manual => "manual",
        }
    }
}

/// A durable record marking that a session must not proceed.
///
/// At most one unresolved record exists per session; resume marks the
/// record resolved and a later block creates a fresh record. Rows are
/// never deleted — the full chain is the audit trail.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct PausedSession {
    /// Unique record identifier.
    pub id: String,
    /// Blocked session identifier (externally owned).
    pub session_id: String,
    /// Owning project identifier.
    pub project_id: String,
    /// Human-readable reason drawn from the matched policy.
    pub reason: String,
    /// Which policy class fired.
    pub pause_type: PauseType,
    /// Reference to the task the session was on when blocked.
    pub current_task_ref: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Whether the pause has been resolved.
    pub resolved: bool,
    /// Resolution timestamp, set on resume.
    pub resolved_at: Option<DateTime<Utc>>,
    /// Who resolved the pause (operator id or automated policy name).
    pub resolved_by: Option<String>,
}

impl PausedSession {
    /// Construct a new unresolved pause record.
    #[must_use]
    pub fn new(
        session_id: String,
        project_id: String,
        reason: String,
        pause_type: PauseType,
        current_task_ref: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            session_id,
            project_id,
            reason,
            pause_type,
            current_task_ref,
            created_at: Utc::now(),
            resolved: false,
            resolved_at: None,
            resolved_by: None,
        }
    }
}

/// One notification/escalation/halt event tied to a pause.
///
/// Immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct InterventionAction {
    /// Unique record identifier.
    pub id: String,
    /// Parent pause record.
    pub paused_session_id: String,
    /// Action kind (e.g. `notify`, `halt`).
    pub action_type: String,
    /// Action-specific payload (e.g. notification channel).
    pub payload: Option<serde_json::Value>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl InterventionAction {
    /// Construct a new action event for a pause record.
    #[must_use]
    pub fn new(
        paused_session_id: String,
        action_type: String,
        payload: Option<serde_json::Value>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            paused_session_id,
            action_type,
            payload,
            created_at: Utc::now(),
        }
    }
}
