//! `SQLite` schema bootstrap logic.
//!
//! All table definitions use `CREATE TABLE IF NOT EXISTS` — safe to
//! re-run on every server startup. Produces a convergent result.
//!
//! The partial unique indexes are the storage-layer serialization points:
//! at most one unresolved pause per session, at most one in-progress
//! recovery per checkpoint, and a gapless `(session_id, sequence)` pair
//! space for checkpoints. Concurrent writers lose these races as
//! unique-violation errors that the managers resolve.

use sqlx::SqlitePool;

use crate::Result;

/// Apply all table definitions to the connected `SQLite` database.
///
/// Creates all five tables idempotently. Safe to call on every startup.
/// `notification_preference` is owned by the notification collaborator
/// and is only ever read here; the definition exists so tests and fresh
/// deployments converge.
///
/// # Errors
///
/// Returns `AppError::Db` if any DDL statement fails.
pub async fn bootstrap_schema(pool: &SqlitePool) -> Result<()> {
    let ddl = r"
CREATE TABLE IF NOT EXISTS paused_session (
    id                TEXT PRIMARY KEY NOT NULL,
    session_id        TEXT NOT NULL,
    project_id        TEXT NOT NULL,
    reason            TEXT NOT NULL,
    pause_type        TEXT NOT NULL CHECK(pause_type IN ('retry_limit','error_threshold','blocked_tool','manual')),
    current_task_ref  TEXT,
    created_at        TEXT NOT NULL,
    resolved          INTEGER NOT NULL DEFAULT 0,
    resolved_at       TEXT,
    resolved_by       TEXT
);

CREATE TABLE IF NOT EXISTS intervention_action (
    id                TEXT PRIMARY KEY NOT NULL,
    paused_session_id TEXT NOT NULL,
    action_type       TEXT NOT NULL,
    payload           TEXT,
    created_at        TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS session_checkpoint (
    id                TEXT PRIMARY KEY NOT NULL,
    session_id        TEXT NOT NULL,
    project_id        TEXT NOT NULL,
    checkpoint_type   TEXT NOT NULL CHECK(checkpoint_type IN ('task_completion','periodic','manual')),
    sequence          INTEGER NOT NULL,
    snapshot          TEXT NOT NULL,
    current_task_ref  TEXT,
    completed_tasks   TEXT NOT NULL,
    metrics           TEXT NOT NULL,
    created_at        TEXT NOT NULL,
    valid             INTEGER NOT NULL DEFAULT 1,
    UNIQUE(session_id, sequence)
);

CREATE TABLE IF NOT EXISTS checkpoint_recovery (
    id                TEXT PRIMARY KEY NOT NULL,
    checkpoint_id     TEXT NOT NULL,
    method            TEXT NOT NULL CHECK(method IN ('manual','automatic')),
    started_at        TEXT NOT NULL,
    completed_at      TEXT,
    status            TEXT NOT NULL CHECK(status IN ('in_progress','succeeded','failed')),
    duration_ms       INTEGER,
    failure_cause     TEXT
);

CREATE TABLE IF NOT EXISTS notification_preference (
    id                TEXT PRIMARY KEY NOT NULL,
    project_id        TEXT NOT NULL,
    channel           TEXT NOT NULL,
    notify_on_pause   INTEGER NOT NULL DEFAULT 1
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_pause_unresolved
    ON paused_session(session_id) WHERE resolved = 0;
CREATE UNIQUE INDEX IF NOT EXISTS idx_recovery_in_progress
    ON checkpoint_recovery(checkpoint_id) WHERE status = 'in_progress';

CREATE INDEX IF NOT EXISTS idx_pause_session ON paused_session(session_id);
CREATE INDEX IF NOT EXISTS idx_action_pause ON intervention_action(paused_session_id);
CREATE INDEX IF NOT EXISTS idx_checkpoint_session ON session_checkpoint(session_id);
CREATE INDEX IF NOT EXISTS idx_recovery_checkpoint ON checkpoint_recovery(checkpoint_id);
CREATE INDEX IF NOT EXISTS idx_preference_project ON notification_preference(project_id);
";

    sqlx::raw_sql(ddl).execute(pool).await?;
    Ok(())
}
