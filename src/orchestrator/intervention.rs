//! Intervention manager driving the pause/resume state machine.
//!
//! The agent loop calls [`InterventionManager::evaluate`] before a risky
//! action; on a block decision it calls [`InterventionManager::pause`],
//! which writes the pause record plus its action events in one
//! transaction. Resume (human or automated) resolves the record. The
//! storage layer enforces at most one unresolved pause per session, so
//! concurrent pause calls collapse into a single record.

use sqlx::SqlitePool;
use tracing::{info, info_span, Instrument};

use crate::config::InterventionConfig;
use crate::models::pause::{InterventionAction, PausedSession, PauseType};
use crate::persistence::pause_repo::PauseRepo;
use crate::persistence::preference_repo::PreferenceRepo;
use crate::policy::{self, ActionDescriptor, PolicyDecision};
use crate::retry::{OpCategory, RetryExecutor};
use crate::{AppError, Result};

/// Parameters for blocking a session.
#[derive(Debug, Clone)]
pub struct PauseRequest {
    /// Session to block (externally owned).
    pub session_id: String,
    /// Owning project identifier.
    pub project_id: String,
    /// Human-readable reason, usually the matched policy's reason.
    pub reason: String,
    /// Which policy class fired.
    pub pause_type: PauseType,
    /// Reference to the task the session was on.
    pub current_task_ref: Option<String>,
}

/// Result of a pause call.
///
/// `AlreadyPaused` is an expected outcome, not an error: concurrent
/// callers racing to pause the same session both receive the surviving
/// record.
#[derive(Debug, Clone)]
pub enum PauseOutcome {
    /// A new pause record was written.
    Created(PausedSession),
    /// An unresolved record already existed; returned as-is.
    AlreadyPaused(PausedSession),
}

impl PauseOutcome {
    /// The pause record, whichever way it was obtained.
    #[must_use]
    pub fn record(&self) -> &PausedSession {
        match self {
            Self::Created(record) | Self::AlreadyPaused(record) => record,
        }
    }

    /// Whether this call created the record.
    #[must_use]
    pub fn was_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }
}

/// Evaluates blocking policies and drives pause/resume transitions.
#[derive(Clone)]
pub struct InterventionManager {
    pause_repo: PauseRepo,
    preference_repo: PreferenceRepo,
    executor: RetryExecutor,
    config: InterventionConfig,
}

impl InterventionManager {
    /// Create a manager over the shared pool.
    #[must_use]
    pub fn new(pool: SqlitePool, executor: RetryExecutor, config: InterventionConfig) -> Self {
        Self {
            pause_repo: PauseRepo::new(pool.clone()),
            preference_repo: PreferenceRepo::new(pool),
            executor,
            config,
        }
    }

    /// Decide whether the session must be blocked before `descriptor` runs.
    ///
    /// Pure policy evaluation; no store access, no side effects.
    #[must_use]
    pub fn evaluate(&self, descriptor: &ActionDescriptor) -> PolicyDecision {
        policy::evaluate(descriptor, &self.config)
    }

    /// Block a session, writing the pause record and its action events.
    ///
    /// Idempotent under races: if an unresolved record already exists —
    /// found by pre-check or surfaced as a uniqueness conflict — the
    /// existing record is returned as [`PauseOutcome::AlreadyPaused`].
    ///
    /// # Errors
    ///
    /// Returns `AppError::RetryExhausted` if the store stays unavailable,
    /// or `AppError::Db` on non-transient persistence failures.
    pub async fn pause(&self, request: PauseRequest) -> Result<PauseOutcome> {
        let span = info_span!("pause_session", session_id = %request.session_id);
        async {
            let outcome = self
                .executor
                .execute(OpCategory::Pause, || self.try_pause(&request))
                .await?;

            if outcome.was_created() {
                info!(
                    paused_session_id = %outcome.record().id,
                    pause_type = outcome.record().pause_type.as_str(),
                    reason = %outcome.record().reason,
                    "session paused"
                );
            } else {
                info!(
                    paused_session_id = %outcome.record().id,
                    "session already paused, returning existing record"
                );
            }

            Ok(outcome)
        }
        .instrument(span)
        .await
    }

    async fn try_pause(&self, request: &PauseRequest) -> Result<PauseOutcome> {
        if let Some(existing) = self
            .pause_repo
            .get_unresolved_for_session(&request.session_id)
            .await?
        {
            return Ok(PauseOutcome::AlreadyPaused(existing));
        }

        let record = PausedSession::new(
            request.session_id.clone(),
            request.project_id.clone(),
            request.reason.clone(),
            request.pause_type,
            request.current_task_ref.clone(),
        );
        let actions = self.build_actions(&record).await?;

        match self.pause_repo.create_with_actions(&record, &actions).await {
            Ok(()) => Ok(PauseOutcome::Created(record)),
            // Lost the race to another pauser; the unique index kept one.
            Err(AppError::Conflict(_)) => {
                let existing = self
                    .pause_repo
                    .get_unresolved_for_session(&request.session_id)
                    .await?
                    .ok_or_else(|| {
                        AppError::Db("pause conflict without surviving record".into())
                    })?;
                Ok(PauseOutcome::AlreadyPaused(existing))
            }
            Err(err) => Err(err),
        }
    }

    /// Build the action events accompanying a pause.
    ///
    /// One row per configured pause action; `notify` is skipped when the
    /// project's preference disables it, and carries the channel payload
    /// when it does not.
    async fn build_actions(&self, record: &PausedSession) -> Result<Vec<InterventionAction>> {
        let preference = self
            .preference_repo
            .get_for_project(&record.project_id)
            .await?;

        let mut actions = Vec::new();
        for action_type in &self.config.pause_actions {
            if action_type == "notify" {
                match &preference {
                    Some(pref) if !pref.notify_on_pause => continue,
                    Some(pref) => {
                        actions.push(InterventionAction::new(
                            record.id.clone(),
                            action_type.clone(),
                            Some(serde_json::json!({ "channel": pref.channel })),
                        ));
                        continue;
                    }
                    None => {}
                }
            }
            actions.push(InterventionAction::new(
                record.id.clone(),
                action_type.clone(),
                None,
            ));
        }
        Ok(actions)
    }

    /// Resolve a pause record, allowing the session to proceed.
    ///
    /// Resume is terminal for the record: a later block creates a new one.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the record does not exist or is
    /// already resolved.
    pub async fn resume(&self, paused_session_id: &str, actor: &str) -> Result<()> {
        let span = info_span!("resume_session", paused_session_id, actor);
        async {
            self.executor
                .execute(OpCategory::Resume, || async {
                    let updated = self.pause_repo.resolve(paused_session_id, actor).await?;
                    if updated == 0 {
                        return match self.pause_repo.get_by_id(paused_session_id).await? {
                            Some(_) => Err(AppError::NotFound(format!(
                                "pause record {paused_session_id} is already resolved"
                            ))),
                            None => Err(AppError::NotFound(format!(
                                "pause record {paused_session_id} does not exist"
                            ))),
                        };
                    }
                    Ok(())
                })
                .await?;

            info!("session resumed");
            Ok(())
        }
        .instrument(span)
        .await
    }

    /// All currently unresolved pause records (monitoring view).
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn active_interventions(&self) -> Result<Vec<PausedSession>> {
        self.executor
            .execute(OpCategory::PauseRead, || self.pause_repo.list_unresolved())
            .await
    }

    /// Full pause history for a session, oldest first (audit view).
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn intervention_history(&self, session_id: &str) -> Result<Vec<PausedSession>> {
        self.executor
            .execute(OpCategory::PauseRead, || {
                self.pause_repo.list_for_session(session_id)
            })
            .await
    }

    /// Action events recorded for a pause, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn actions_for(&self, paused_session_id: &str) -> Result<Vec<InterventionAction>> {
        self.executor
            .execute(OpCategory::PauseRead, || {
                self.pause_repo.list_actions(paused_session_id)
            })
            .await
    }
}
