//! Checkpoint recovery: selection, lifecycle tracking, and restore.
//!
//! A recovery targets a fixed checkpoint id decided when it starts; a
//! newer checkpoint created mid-recovery never retargets it. The storage
//! layer allows at most one in-progress recovery per checkpoint.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{info, info_span, warn, Instrument};

use crate::models::checkpoint::{SessionCheckpoint, SessionSnapshot};
use crate::models::recovery::{
    CheckpointRecovery, RecoveryMethod, RecoveryStatus, RestoredState,
};
use crate::persistence::checkpoint_repo::CheckpointRepo;
use crate::persistence::recovery_repo::RecoveryRepo;
use crate::retry::{OpCategory, RetryExecutor};
use crate::{AppError, Result};

/// Result of a start-recovery call.
///
/// `AlreadyRecovering` is an expected outcome under races, not an error.
#[derive(Debug, Clone)]
pub enum RecoveryStart {
    /// A new in-progress recovery was written.
    Started(CheckpointRecovery),
    /// An in-progress recovery already existed; returned as-is.
    AlreadyRecovering(CheckpointRecovery),
}

impl RecoveryStart {
    /// The recovery record, whichever way it was obtained.
    #[must_use]
    pub fn record(&self) -> &CheckpointRecovery {
        match self {
            Self::Started(record) | Self::AlreadyRecovering(record) => record,
        }
    }

    /// Whether this call created the record.
    #[must_use]
    pub fn was_started(&self) -> bool {
        matches!(self, Self::Started(_))
    }
}

/// Terminal outcome reported by the agent loop when recovery finishes.
#[derive(Debug, Clone)]
pub enum RecoveryOutcome {
    /// Session state was restored.
    Succeeded,
    /// Restore failed; the cause is preserved for operator inspection.
    Failed {
        /// Underlying cause of the failure.
        cause: String,
    },
}

/// Selects and restores checkpoints and tracks recovery attempts.
#[derive(Clone)]
pub struct RecoveryManager {
    checkpoint_repo: CheckpointRepo,
    recovery_repo: RecoveryRepo,
    executor: RetryExecutor,
}

impl RecoveryManager {
    /// Create a manager over the shared pool.
    #[must_use]
    pub fn new(pool: SqlitePool, executor: RetryExecutor) -> Self {
        Self {
            checkpoint_repo: CheckpointRepo::new(pool.clone()),
            recovery_repo: RecoveryRepo::new(pool),
            executor,
        }
    }

    /// The single resumable checkpoint for a session: `valid = true` with
    /// the maximum sequence, or none if no valid checkpoint exists.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn get_latest_resumable(&self, session_id: &str) -> Result<Option<SessionCheckpoint>> {
        self.executor
            .execute(OpCategory::CheckpointRead, || {
                self.checkpoint_repo.latest_resumable(session_id)
            })
            .await
    }

    /// Begin a tracked recovery against a fixed checkpoint.
    ///
    /// Idempotent under races: if an in-progress recovery already exists
    /// for the checkpoint — found by pre-check or surfaced as a
    /// uniqueness conflict — it is returned as
    /// [`RecoveryStart::AlreadyRecovering`].
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the checkpoint does not exist.
    pub async fn start_recovery(
        &self,
        checkpoint_id: &str,
        method: RecoveryMethod,
    ) -> Result<RecoveryStart> {
        let span = info_span!("start_recovery", checkpoint_id, method = method.as_str());
        async {
            let start = self
                .executor
                .execute(OpCategory::Recovery, || {
                    self.try_start(checkpoint_id, method)
                })
                .await?;

            if start.was_started() {
                info!(recovery_id = %start.record().id, "recovery started");
            } else {
                info!(
                    recovery_id = %start.record().id,
                    "recovery already in progress, returning existing record"
                );
            }

            Ok(start)
        }
        .instrument(span)
        .await
    }

    async fn try_start(&self, checkpoint_id: &str, method: RecoveryMethod) -> Result<RecoveryStart> {
        if self.checkpoint_repo.get_by_id(checkpoint_id).await?.is_none() {
            return Err(AppError::NotFound(format!(
                "checkpoint {checkpoint_id} does not exist"
            )));
        }

        if let Some(existing) = self
            .recovery_repo
            .get_in_progress_for_checkpoint(checkpoint_id)
            .await?
        {
            return Ok(RecoveryStart::AlreadyRecovering(existing));
        }

        let recovery = CheckpointRecovery::new(checkpoint_id.to_owned(), method);
        match self.recovery_repo.insert(&recovery).await {
            Ok(()) => Ok(RecoveryStart::Started(recovery)),
            // Lost the race to another recoverer; the unique index kept one.
            Err(AppError::Conflict(_)) => {
                let existing = self
                    .recovery_repo
                    .get_in_progress_for_checkpoint(checkpoint_id)
                    .await?
                    .ok_or_else(|| {
                        AppError::Db("recovery conflict without surviving record".into())
                    })?;
                Ok(RecoveryStart::AlreadyRecovering(existing))
            }
            Err(err) => Err(err),
        }
    }

    /// Transition a recovery to its terminal status, once.
    ///
    /// Sets the completion timestamp and the derived duration; records the
    /// failure cause on failed recoveries. The record is immutable
    /// afterwards.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the record does not exist, or
    /// `AppError::InvalidTransition` if it is not in progress.
    pub async fn complete_recovery(
        &self,
        recovery_id: &str,
        outcome: &RecoveryOutcome,
    ) -> Result<CheckpointRecovery> {
        let span = info_span!("complete_recovery", recovery_id);
        async {
            let completed = self
                .executor
                .execute(OpCategory::Recovery, || {
                    self.try_complete(recovery_id, outcome)
                })
                .await?;

            match &outcome {
                RecoveryOutcome::Succeeded => info!(
                    duration_ms = completed.duration_ms,
                    "recovery succeeded"
                ),
                RecoveryOutcome::Failed { cause } => warn!(
                    duration_ms = completed.duration_ms,
                    cause = %cause,
                    "recovery failed"
                ),
            }

            Ok(completed)
        }
        .instrument(span)
        .await
    }

    async fn try_complete(
        &self,
        recovery_id: &str,
        outcome: &RecoveryOutcome,
    ) -> Result<CheckpointRecovery> {
        let recovery = self
            .recovery_repo
            .get_by_id(recovery_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("recovery {recovery_id} does not exist"))
            })?;

        if recovery.status != RecoveryStatus::InProgress {
            return Err(AppError::InvalidTransition(format!(
                "recovery {recovery_id} is already {}",
                recovery.status.as_str()
            )));
        }

        let (status, failure_cause) = match outcome {
            RecoveryOutcome::Succeeded => (RecoveryStatus::Succeeded, None),
            RecoveryOutcome::Failed { cause } => (RecoveryStatus::Failed, Some(cause.as_str())),
        };

        let completed_at = Utc::now();
        let duration_ms = (completed_at - recovery.started_at).num_milliseconds();

        let updated = self
            .recovery_repo
            .complete(recovery_id, status, completed_at, duration_ms, failure_cause)
            .await?;
        if updated == 0 {
            // Someone else completed it between the read and the update.
            return Err(AppError::InvalidTransition(format!(
                "recovery {recovery_id} was completed concurrently"
            )));
        }

        self.recovery_repo
            .get_by_id(recovery_id)
            .await?
            .ok_or_else(|| AppError::Db("completed recovery vanished".into()))
    }

    /// Reconstruct the in-memory session state from a checkpoint.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the checkpoint does not exist,
    /// `AppError::InvalidCheckpoint` if it has been invalidated, or
    /// `AppError::CorruptCheckpoint` if its snapshot fails to
    /// deserialize. Corruption is fatal for this checkpoint only; older
    /// valid checkpoints remain restorable.
    pub async fn restore_from_checkpoint(&self, checkpoint_id: &str) -> Result<RestoredState> {
        let span = info_span!("restore_from_checkpoint", checkpoint_id);
        async {
            let checkpoint = self
                .executor
                .execute(OpCategory::CheckpointRead, || {
                    self.checkpoint_repo.get_by_id(checkpoint_id)
                })
                .await?
                .ok_or_else(|| {
                    AppError::NotFound(format!("checkpoint {checkpoint_id} does not exist"))
                })?;

            if !checkpoint.valid {
                return Err(AppError::InvalidCheckpoint(format!(
                    "checkpoint {checkpoint_id} has been invalidated"
                )));
            }

            let snapshot: SessionSnapshot = serde_json::from_value(checkpoint.snapshot.clone())
                .map_err(|err| {
                    warn!(error = %err, "checkpoint snapshot failed to deserialize");
                    AppError::CorruptCheckpoint(format!(
                        "checkpoint {checkpoint_id} snapshot failed to deserialize: {err}"
                    ))
                })?;

            info!(sequence = checkpoint.sequence, "checkpoint restored");

            Ok(RestoredState {
                checkpoint_id: checkpoint.id,
                sequence: checkpoint.sequence,
                snapshot,
                current_task_ref: checkpoint.current_task_ref,
                completed_tasks: checkpoint.completed_tasks,
                metrics: checkpoint.metrics,
            })
        }
        .instrument(span)
        .await
    }

    /// Every recovery attempt for a checkpoint with durations and
    /// statuses, oldest first (monitoring view).
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn recovery_history(&self, checkpoint_id: &str) -> Result<Vec<CheckpointRecovery>> {
        self.executor
            .execute(OpCategory::Recovery, || {
                self.recovery_repo.list_for_checkpoint(checkpoint_id)
            })
            .await
    }
}
