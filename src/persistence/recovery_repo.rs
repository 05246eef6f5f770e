//! Recovery lifecycle repository for `SQLite` persistence.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::models::recovery::{CheckpointRecovery, RecoveryMethod, RecoveryStatus};
use crate::{AppError, Result};

/// Repository wrapper around `SQLite` for recovery records.
#[derive(Clone)]
pub struct RecoveryRepo {
    pool: SqlitePool,
}

/// Internal row struct for `SQLite` deserialization.
#[derive(sqlx::FromRow)]
struct RecoveryRow {
    id: String,
    checkpoint_id: String,
    method: String,
    started_at: String,
    completed_at: Option<String>,
    status: String,
    duration_ms: Option<i64>,
    failure_cause: Option<String>,
}

impl RecoveryRow {
    /// Convert a database row into the domain model.
    fn into_recovery(self) -> Result<CheckpointRecovery> {
        Ok(CheckpointRecovery {
            method: parse_method(&self.method)?,
            status: parse_status(&self.status)?,
            started_at: parse_timestamp(&self.started_at, "started_at")?,
            completed_at: self
                .completed_at
                .as_deref()
                .map(|ts| parse_timestamp(ts, "completed_at"))
                .transpose()?,
            id: self.id,
            checkpoint_id: self.checkpoint_id,
            duration_ms: self.duration_ms,
            failure_cause: self.failure_cause,
        })
    }
}

fn parse_method(s: &str) -> Result<RecoveryMethod> {
    match s {
        "manual" => Ok(RecoveryMethod::Manual),
        "automatic" => Ok(RecoveryMethod::Automatic),
        other => Err(AppError::Db(format!("invalid recovery method: {other}"))),
    }
}

fn parse_status(s: &str) -> Result<RecoveryStatus> {
    match s {
        "in_progress" => Ok(RecoveryStatus::InProgress),
        "succeeded" => Ok(RecoveryStatus::Succeeded),
        "failed" => Ok(RecoveryStatus::Failed),
        other => Err(AppError::Db(format!("invalid recovery status: {other}"))),
    }
}

fn parse_timestamp(s: &str, column: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::Db(format!("invalid {column}: {e}")))
}

impl RecoveryRepo {
    /// Create a new repository instance.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new in-progress recovery record.
    ///
    /// The partial unique index on in-progress rows rejects a second
    /// concurrent recovery for the same checkpoint; the violation
    /// surfaces as `AppError::Conflict`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Conflict` on the concurrent-recovery race, or
    /// `AppError::Db` if the insert fails.
    pub async fn insert(&self, recovery: &CheckpointRecovery) -> Result<()> {
        sqlx::query(
            "INSERT INTO checkpoint_recovery (id, checkpoint_id, method, started_at,
             completed_at, status, duration_ms, failure_cause)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(&recovery.id)
        .bind(&recovery.checkpoint_id)
        .bind(recovery.method.as_str())
        .bind(recovery.started_at.to_rfc3339())
        .bind(recovery.completed_at.map(|ts| ts.to_rfc3339()))
        .bind(recovery.status.as_str())
        .bind(recovery.duration_ms)
        .bind(&recovery.failure_cause)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Retrieve a recovery record by its ID.
    ///
    /// Returns `Ok(None)` if the record does not exist.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<CheckpointRecovery>> {
        let row: Option<RecoveryRow> =
            sqlx::query_as("SELECT * FROM checkpoint_recovery WHERE id = ?1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(RecoveryRow::into_recovery).transpose()
    }

    /// Retrieve the in-progress recovery for a checkpoint, if any.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn get_in_progress_for_checkpoint(
        &self,
        checkpoint_id: &str,
    ) -> Result<Option<CheckpointRecovery>> {
        let row: Option<RecoveryRow> = sqlx::query_as(
            "SELECT * FROM checkpoint_recovery
             WHERE checkpoint_id = ?1 AND status = 'in_progress' LIMIT 1",
        )
        .bind(checkpoint_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(RecoveryRow::into_recovery).transpose()
    }

    /// Transition an in-progress recovery to a terminal status.
    ///
    /// Guarded by `WHERE status = 'in_progress'` so a completed record can
    /// never transition again. Returns the number of rows updated: 0 means
    /// the record was missing or already terminal.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the update fails.
    pub async fn complete(
        &self,
        id: &str,
        status: RecoveryStatus,
        completed_at: DateTime<Utc>,
        duration_ms: i64,
        failure_cause: Option<&str>,
    ) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE checkpoint_recovery
             SET status = ?1, completed_at = ?2, duration_ms = ?3, failure_cause = ?4
             WHERE id = ?5 AND status = 'in_progress'",
        )
        .bind(status.as_str())
        .bind(completed_at.to_rfc3339())
        .bind(duration_ms)
        .bind(failure_cause)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// List every recovery attempt for a checkpoint, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn list_for_checkpoint(&self, checkpoint_id: &str) -> Result<Vec<CheckpointRecovery>> {
        let rows: Vec<RecoveryRow> = sqlx::query_as(
            "SELECT * FROM checkpoint_recovery WHERE checkpoint_id = ?1 ORDER BY started_at",
        )
        .bind(checkpoint_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(RecoveryRow::into_recovery).collect()
    }
}
