//! Policy evaluator deciding whether a session must be blocked.
//!
//! Applies the ordered blocking checks against an action descriptor.
//! First matching policy wins and names itself in the reason. Pure
//! decision logic — pausing is the intervention manager's job.

use tracing::{info, info_span};

use crate::config::InterventionConfig;
use crate::models::pause::PauseType;

/// Snapshot of session state supplied by the agent loop for evaluation.
#[derive(Debug, Clone, Default)]
pub struct ActionDescriptor {
    /// Name of the action about to run.
    pub action: String,
    /// Consecutive retries the session has burned on its current task.
    pub consecutive_retries: u32,
    /// Error rate over the session's recent window, in `[0.0, 1.0]`.
    pub error_rate: f64,
    /// Operator-set manual block flag.
    pub manual_block: bool,
}

/// Result of a blocking-policy evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyDecision {
    /// Whether the session must be blocked before this action.
    pub blocked: bool,
    /// Which pause class fired, when blocked.
    pub pause_type: Option<PauseType>,
    /// Human-readable reason naming the matched policy, when blocked.
    pub reason: Option<String>,
}

impl PolicyDecision {
    fn allow() -> Self {
        Self {
            blocked: false,
            pause_type: None,
            reason: None,
        }
    }

    fn block(pause_type: PauseType, reason: String) -> Self {
        Self {
            blocked: true,
            pause_type: Some(pause_type),
            reason: Some(reason),
        }
    }
}

/// Evaluate the ordered blocking policies against an action descriptor.
///
/// Evaluation order:
/// 1. Consecutive-retry limit.
/// 2. Error-rate threshold.
/// 3. Disallowed action list.
/// 4. Manual block flag.
///
/// No side effects; the caller decides whether to pause.
#[must_use]
pub fn evaluate(descriptor: &ActionDescriptor, config: &InterventionConfig) -> PolicyDecision {
    let _span = info_span!("policy_evaluate", action = %descriptor.action).entered();

    // ── 1. Consecutive-retry limit ───────────────────────────
    if descriptor.consecutive_retries >= config.max_consecutive_retries {
        let reason = format!(
            "consecutive retry limit exceeded: {} >= {}",
            descriptor.consecutive_retries, config.max_consecutive_retries
        );
        info!(reason = %reason, "session blocked");
        return PolicyDecision::block(PauseType::RetryLimit, reason);
    }

    // ── 2. Error-rate threshold ──────────────────────────────
    if descriptor.error_rate >= config.error_rate_threshold {
        let reason = format!(
            "error rate threshold exceeded: {:.2} >= {:.2}",
            descriptor.error_rate, config.error_rate_threshold
        );
        info!(reason = %reason, "session blocked");
        return PolicyDecision::block(PauseType::ErrorThreshold, reason);
    }

    // ── 3. Disallowed action ─────────────────────────────────
    if config.blocked_actions.contains(&descriptor.action) {
        let reason = format!("blocked action attempted: {}", descriptor.action);
        info!(reason = %reason, "session blocked");
        return PolicyDecision::block(PauseType::BlockedTool, reason);
    }

    // ── 4. Manual block flag ─────────────────────────────────
    if descriptor.manual_block {
        let reason = "manual block flag set by operator".to_owned();
        info!(reason = %reason, "session blocked");
        return PolicyDecision::block(PauseType::Manual, reason);
    }

    PolicyDecision::allow()
}
