//! Pause registry repository for `SQLite` persistence.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::models::pause::{InterventionAction, PausedSession, PauseType};
use crate::{AppError, Result};

/// Repository wrapper around `SQLite` for the pause registry.
#[derive(Clone)]
pub struct PauseRepo {
    pool: SqlitePool,
}

/// Internal row struct for `SQLite` deserialization.
#[derive(sqlx::FromRow)]
struct PausedSessionRow {
    id: String,
    session_id: String,
    project_id: String,
    reason: String,
    pause_type: String,
    current_task_ref: Option<String>,
    created_at: String,
    resolved: i64,
    resolved_at: Option<String>,
    resolved_by: Option<String>,
}

impl PausedSessionRow {
    /// Convert a database row into the domain model.
    fn into_paused_session(self) -> Result<PausedSession> {
        Ok(PausedSession {
            pause_type: parse_pause_type(&self.pause_type)?,
            created_at: parse_timestamp(&self.created_at, "created_at")?,
            resolved: self.resolved != 0,
            resolved_at: self
                .resolved_at
                .as_deref()
                .map(|ts| parse_timestamp(ts, "resolved_at"))
                .transpose()?,
            id: self.id,
            session_id: self.session_id,
            project_id: self.project_id,
            reason: self.reason,
            current_task_ref: self.current_task_ref,
            resolved_by: self.resolved_by,
        })
    }
}

#[derive(sqlx::FromRow)]
struct InterventionActionRow {
    id: String,
    paused_session_id: String,
    action_type: String,
    payload: Option<String>,
    created_at: String,
}

impl InterventionActionRow {
    fn into_action(self) -> Result<InterventionAction> {
        let payload = self
            .payload
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
            .map_err(|e| AppError::Db(format!("invalid action payload: {e}")))?;

        Ok(InterventionAction {
            created_at: parse_timestamp(&self.created_at, "created_at")?,
            id: self.id,
            paused_session_id: self.paused_session_id,
            action_type: self.action_type,
            payload,
        })
    }
}

fn parse_pause_type(s: &str) -> Result<PauseType> {
    match s {
        "retry_limit" => Ok(PauseType::RetryLimit),
        "error_threshold" => Ok(PauseType::ErrorThreshold),
        "blocked_tool" => Ok(PauseType::BlockedTool),
        "manual" => Ok(PauseType::Manual),
        other => Err(AppError::Db(format!("invalid pause type: {other}"))),
    }
}

fn parse_timestamp(s: &str, column: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::Db(format!("invalid {column}: {e}")))
}

impl PauseRepo {
    /// Create a new repository instance.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a pause record and its action events in a single transaction.
    ///
    /// The partial unique index on unresolved rows rejects a second
    /// unresolved pause for the same session; the violation surfaces as
    /// `AppError::Conflict` and the whole transaction rolls back.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Conflict` on the unresolved-pause race, or
    /// `AppError::Db` if any insert fails.
    pub async fn create_with_actions(
        &self,
        record: &PausedSession,
        actions: &[InterventionAction],
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO paused_session (id, session_id, project_id, reason, pause_type,
             current_task_ref, created_at, resolved, resolved_at, resolved_by)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        )
        .bind(&record.id)
        .bind(&record.session_id)
        .bind(&record.project_id)
        .bind(&record.reason)
        .bind(record.pause_type.as_str())
        .bind(&record.current_task_ref)
        .bind(record.created_at.to_rfc3339())
        .bind(i64::from(record.resolved))
        .bind(record.resolved_at.map(|ts| ts.to_rfc3339()))
        .bind(&record.resolved_by)
        .execute(&mut *tx)
        .await?;

        for action in actions {
            let payload = action
                .payload
                .as_ref()
                .map(serde_json::to_string)
                .transpose()
                .map_err(|e| AppError::Db(format!("serialize action payload: {e}")))?;

            sqlx::query(
                "INSERT INTO intervention_action (id, paused_session_id, action_type,
                 payload, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )
            .bind(&action.id)
            .bind(&action.paused_session_id)
            .bind(&action.action_type)
            .bind(&payload)
            .bind(action.created_at.to_rfc3339())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Retrieve a pause record by its ID.
    ///
    /// Returns `Ok(None)` if the record does not exist.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<PausedSession>> {
        let row: Option<PausedSessionRow> =
            sqlx::query_as("SELECT * FROM paused_session WHERE id = ?1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(PausedSessionRow::into_paused_session).transpose()
    }

    /// Retrieve the unresolved pause record for a session, if any.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn get_unresolved_for_session(&self, session_id: &str) -> Result<Option<PausedSession>> {
        let row: Option<PausedSessionRow> = sqlx::query_as(
            "SELECT * FROM paused_session WHERE session_id = ?1 AND resolved = 0 LIMIT 1",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(PausedSessionRow::into_paused_session).transpose()
    }

    /// Mark an unresolved pause record resolved.
    ///
    /// Returns the number of rows updated: 0 means the record was missing
    /// or already resolved, which the manager surfaces as `NotFound`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the update fails.
    pub async fn resolve(&self, id: &str, actor: &str) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE paused_session
             SET resolved = 1, resolved_at = ?1, resolved_by = ?2
             WHERE id = ?3 AND resolved = 0",
        )
        .bind(Utc::now().to_rfc3339())
        .bind(actor)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// List all unresolved pause records (active interventions view).
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn list_unresolved(&self) -> Result<Vec<PausedSession>> {
        let rows: Vec<PausedSessionRow> = sqlx::query_as(
            "SELECT * FROM paused_session WHERE resolved = 0 ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(PausedSessionRow::into_paused_session)
            .collect()
    }

    /// List every pause record for a session, oldest first (audit view).
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn list_for_session(&self, session_id: &str) -> Result<Vec<PausedSession>> {
        let rows: Vec<PausedSessionRow> = sqlx::query_as(
            "SELECT * FROM paused_session WHERE session_id = ?1 ORDER BY created_at",
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(PausedSessionRow::into_paused_session)
            .collect()
    }

    /// List the action events recorded for a pause, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn list_actions(&self, paused_session_id: &str) -> Result<Vec<InterventionAction>> {
        let rows: Vec<InterventionActionRow> = sqlx::query_as(
            "SELECT * FROM intervention_action WHERE paused_session_id = ?1 ORDER BY created_at",
        )
        .bind(paused_session_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(InterventionActionRow::into_action)
            .collect()
    }
}
