//! Checkpoint creation and invalidation.
//!
//! Checkpoints touch their own table only, so creating one never blocks
//! on or is blocked by pause/resume. Sequence assignment happens inside
//! the insert transaction; a concurrent writer that grabs the same
//! sequence loses at the store's uniqueness constraint and the retry
//! executor re-runs the transaction, recomputing the sequence.

use sqlx::SqlitePool;
use tracing::{info, info_span, Instrument};

use crate::models::checkpoint::{NewCheckpoint, SessionCheckpoint};
use crate::persistence::checkpoint_repo::CheckpointRepo;
use crate::retry::{FailureKind, OpCategory, RetryExecutor};
use crate::{AppError, Result};

/// Creates and invalidates session checkpoints.
#[derive(Clone)]
pub struct CheckpointManager {
    repo: CheckpointRepo,
    executor: RetryExecutor,
}

/// Sequence races are retryable here: the next attempt recomputes
/// `max(sequence) + 1` inside a fresh transaction.
fn classify_create_error(err: &AppError) -> FailureKind {
    match err {
        AppError::DbUnavailable(_) | AppError::Conflict(_) => FailureKind::Transient,
        _ => FailureKind::Permanent,
    }
}

impl CheckpointManager {
    /// Create a manager over the shared pool.
    #[must_use]
    pub fn new(pool: SqlitePool, executor: RetryExecutor) -> Self {
        Self {
            repo: CheckpointRepo::new(pool),
            executor,
        }
    }

    /// Persist a snapshot of session state after a unit of work.
    ///
    /// Assigns the next sequence number for the session (starting at 1)
    /// and inserts with `valid = true`, all in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `AppError::RetryExhausted` if the store stays unavailable
    /// or the sequence race never resolves, or `AppError::Db` on
    /// non-transient persistence failures.
    pub async fn create_checkpoint(&self, new: NewCheckpoint) -> Result<SessionCheckpoint> {
        let span = info_span!(
            "create_checkpoint",
            session_id = %new.session_id,
            checkpoint_type = new.checkpoint_type.as_str()
        );
        async {
            let checkpoint = self
                .executor
                .execute_with(
                    OpCategory::CheckpointWrite,
                    || self.repo.insert_next(new.clone()),
                    classify_create_error,
                )
                .await?;

            info!(
                checkpoint_id = %checkpoint.id,
                sequence = checkpoint.sequence,
                "checkpoint created"
            );

            Ok(checkpoint)
        }
        .instrument(span)
        .await
    }

    /// Mark all checkpoints with sequence ≤ `up_to_sequence` invalid.
    ///
    /// Used when a session restarts from a point that supersedes earlier
    /// state, or after a recovery so stale checkpoints are never offered
    /// again. Idempotent; rows are kept for the audit trail. Returns the
    /// number of checkpoints newly invalidated.
    ///
    /// # Errors
    ///
    /// Returns `AppError::RetryExhausted` if the store stays unavailable,
    /// or `AppError::Db` on non-transient persistence failures.
    pub async fn invalidate_checkpoints(
        &self,
        session_id: &str,
        up_to_sequence: i64,
    ) -> Result<u64> {
        let span = info_span!("invalidate_checkpoints", session_id, up_to_sequence);
        async {
            let invalidated = self
                .executor
                .execute(OpCategory::CheckpointWrite, || {
                    self.repo.invalidate_up_to(session_id, up_to_sequence)
                })
                .await?;

            info!(invalidated, "checkpoints invalidated");
            Ok(invalidated)
        }
        .instrument(span)
        .await
    }

    /// The newest checkpoint for a session, valid or not (monitoring view).
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn latest_for_session(&self, session_id: &str) -> Result<Option<SessionCheckpoint>> {
        self.executor
            .execute(OpCategory::CheckpointRead, || {
                self.repo.latest_for_session(session_id)
            })
            .await
    }

    /// Every checkpoint for a session in sequence order (audit view).
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn list_for_session(&self, session_id: &str) -> Result<Vec<SessionCheckpoint>> {
        self.executor
            .execute(OpCategory::CheckpointRead, || {
                self.repo.list_for_session(session_id)
            })
            .await
    }
}
