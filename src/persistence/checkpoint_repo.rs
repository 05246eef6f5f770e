//! Checkpoint repository for `SQLite` persistence.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::models::checkpoint::{
    CheckpointType, MetricsSnapshot, NewCheckpoint, SessionCheckpoint,
};
use crate::{AppError, Result};

/// Repository wrapper around `SQLite` for checkpoint records.
#[derive(Clone)]
pub struct CheckpointRepo {
    pool: SqlitePool,
}

/// Internal row struct for `SQLite` deserialization.
#[derive(sqlx::FromRow)]
struct CheckpointRow {
    id: String,
    session_id: String,
    project_id: String,
    checkpoint_type: String,
    sequence: i64,
    snapshot: String,
    current_task_ref: Option<String>,
    completed_tasks: String,
    metrics: String,
    created_at: String,
    valid: i64,
}

impl CheckpointRow {
    /// Convert a database row into the domain model.
    fn into_checkpoint(self) -> Result<SessionCheckpoint> {
        let snapshot = serde_json::from_str(&self.snapshot)
            .map_err(|e| AppError::Db(format!("invalid snapshot column: {e}")))?;
        let completed_tasks = serde_json::from_str(&self.completed_tasks)
            .map_err(|e| AppError::Db(format!("invalid completed_tasks: {e}")))?;
        let metrics: MetricsSnapshot = serde_json::from_str(&self.metrics)
            .map_err(|e| AppError::Db(format!("invalid metrics: {e}")))?;
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .map_err(|e| AppError::Db(format!("invalid created_at: {e}")))?
            .with_timezone(&Utc);

        Ok(SessionCheckpoint {
            checkpoint_type: parse_checkpoint_type(&self.checkpoint_type)?,
            valid: self.valid != 0,
            id: self.id,
            session_id: self.session_id,
            project_id: self.project_id,
            sequence: self.sequence,
            snapshot,
            current_task_ref: self.current_task_ref,
            completed_tasks,
            metrics,
            created_at,
        })
    }
}

fn parse_checkpoint_type(s: &str) -> Result<CheckpointType> {
    match s {
        "task_completion" => Ok(CheckpointType::TaskCompletion),
        "periodic" => Ok(CheckpointType::Periodic),
        "manual" => Ok(CheckpointType::Manual),
        other => Err(AppError::Db(format!("invalid checkpoint type: {other}"))),
    }
}

impl CheckpointRepo {
    /// Create a new repository instance.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a checkpoint with the next sequence number for its session.
    ///
    /// Computes `max(sequence) + 1` (starting at 1) and inserts inside one
    /// transaction. A concurrent writer that takes the same sequence loses
    /// at the `UNIQUE(session_id, sequence)` constraint, surfaced as
    /// `AppError::Conflict`; the manager retries, recomputing the sequence.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Conflict` on a sequence race, or `AppError::Db`
    /// if serialization or the insert fails.
    pub async fn insert_next(&self, new: NewCheckpoint) -> Result<SessionCheckpoint> {
        let mut tx = self.pool.begin().await?;

        let max_sequence: Option<i64> = sqlx::query_scalar(
            "SELECT MAX(sequence) FROM session_checkpoint WHERE session_id = ?1",
        )
        .bind(&new.session_id)
        .fetch_one(&mut *tx)
        .await?;

        let checkpoint = new.into_checkpoint(max_sequence.unwrap_or(0) + 1);

        let snapshot = serde_json::to_string(&checkpoint.snapshot)
            .map_err(|e| AppError::Db(format!("serialize snapshot: {e}")))?;
        let completed_tasks = serde_json::to_string(&checkpoint.completed_tasks)
            .map_err(|e| AppError::Db(format!("serialize completed_tasks: {e}")))?;
        let metrics = serde_json::to_string(&checkpoint.metrics)
            .map_err(|e| AppError::Db(format!("serialize metrics: {e}")))?;

        sqlx::query(
            "INSERT INTO session_checkpoint (id, session_id, project_id, checkpoint_type,
             sequence, snapshot, current_task_ref, completed_tasks, metrics, created_at, valid)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        )
        .bind(&checkpoint.id)
        .bind(&checkpoint.session_id)
        .bind(&checkpoint.project_id)
        .bind(checkpoint.checkpoint_type.as_str())
        .bind(checkpoint.sequence)
        .bind(&snapshot)
        .bind(&checkpoint.current_task_ref)
        .bind(&completed_tasks)
        .bind(&metrics)
        .bind(checkpoint.created_at.to_rfc3339())
        .bind(i64::from(checkpoint.valid))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(checkpoint)
    }

    /// Retrieve a checkpoint by its ID.
    ///
    /// Returns `Ok(None)` if the checkpoint does not exist.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<SessionCheckpoint>> {
        let row: Option<CheckpointRow> =
            sqlx::query_as("SELECT * FROM session_checkpoint WHERE id = ?1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(CheckpointRow::into_checkpoint).transpose()
    }

    /// Retrieve the valid checkpoint with the highest sequence for a session.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn latest_resumable(&self, session_id: &str) -> Result<Option<SessionCheckpoint>> {
        let row: Option<CheckpointRow> = sqlx::query_as(
            "SELECT * FROM session_checkpoint
             WHERE session_id = ?1 AND valid = 1
             ORDER BY sequence DESC LIMIT 1",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(CheckpointRow::into_checkpoint).transpose()
    }

    /// Retrieve the newest checkpoint for a session, valid or not.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn latest_for_session(&self, session_id: &str) -> Result<Option<SessionCheckpoint>> {
        let row: Option<CheckpointRow> = sqlx::query_as(
            "SELECT * FROM session_checkpoint
             WHERE session_id = ?1
             ORDER BY sequence DESC LIMIT 1",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(CheckpointRow::into_checkpoint).transpose()
    }

    /// Mark all checkpoints with sequence ≤ `up_to_sequence` invalid.
    ///
    /// Idempotent; never deletes rows. Returns the number of rows changed.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the update fails.
    pub async fn invalidate_up_to(&self, session_id: &str, up_to_sequence: i64) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE session_checkpoint SET valid = 0
             WHERE session_id = ?1 AND sequence <= ?2 AND valid = 1",
        )
        .bind(session_id)
        .bind(up_to_sequence)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// List every checkpoint for a session in sequence order (audit view).
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn list_for_session(&self, session_id: &str) -> Result<Vec<SessionCheckpoint>> {
        let rows: Vec<CheckpointRow> = sqlx::query_as(
            "SELECT * FROM session_checkpoint WHERE session_id = ?1 ORDER BY sequence",
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(CheckpointRow::into_checkpoint).collect()
    }
}
