//! Process-wide retry statistics.
//!
//! One [`RetryStats`] instance is constructed per process and shared
//! (via `Arc`) by every retry executor. Counters are plain atomics; the
//! exposed view is a point-in-time [`StatsSnapshot`].

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Operation categories tracked by the retry statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OpCategory {
    /// Pause-record writes.
    Pause,
    /// Resume-record writes.
    Resume,
    /// Pause registry lookups.
    PauseRead,
    /// Checkpoint creation and invalidation.
    CheckpointWrite,
    /// Checkpoint lookups.
    CheckpointRead,
    /// Recovery lifecycle writes and reads.
    Recovery,
}

impl OpCategory {
    /// All categories, in counter-array order.
    pub const ALL: [Self; 6] = [
        Self::Pause,
        Self::Resume,
        Self::PauseRead,
        Self::CheckpointWrite,
        Self::CheckpointRead,
        Self::Recovery,
    ];

    /// Stable name used in logs and snapshots.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::PauseRead => "pause_read",
            Self::CheckpointWrite => "checkpoint_write",
            Self::CheckpointRead => "checkpoint_read",
            Self::Recovery => "recovery",
        }
    }

    fn index(self) -> usize {
        match self {
            Self::Pause => 0,
            Self::Resume => 1,
            Self::PauseRead => 2,
            Self::CheckpointWrite => 3,
            Self::CheckpointRead => 4,
            Self::Recovery => 5,
        }
    }
}

#[derive(Debug, Default)]
struct Counters {
    attempts: AtomicU64,
    retries: AtomicU64,
    successes_after_retry: AtomicU64,
    permanent_failures: AtomicU64,
}

/// Shared mutable retry counters, reset only at process start.
#[derive(Debug, Default)]
pub struct RetryStats {
    per_category: [Counters; 6],
}

impl RetryStats {
    /// Create a zeroed counter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one attempt (first try or retry alike).
    pub fn record_attempt(&self, category: OpCategory) {
        self.per_category[category.index()]
            .attempts
            .fetch_add(1, Ordering::Relaxed);
    }

    /// Record a scheduled retry after a transient failure.
    pub fn record_retry(&self, category: OpCategory) {
        self.per_category[category.index()]
            .retries
            .fetch_add(1, Ordering::Relaxed);
    }

    /// Record a success that needed at least one retry.
    pub fn record_success_after_retry(&self, category: OpCategory) {
        self.per_category[category.index()]
            .successes_after_retry
            .fetch_add(1, Ordering::Relaxed);
    }

    /// Record a terminal failure (permanent class or budget exhausted).
    pub fn record_permanent_failure(&self, category: OpCategory) {
        self.per_category[category.index()]
            .permanent_failures
            .fetch_add(1, Ordering::Relaxed);
    }

    /// Take a point-in-time read-only snapshot of all counters.
    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        let categories = OpCategory::ALL
            .iter()
            .map(|&category| {
                let counters = &self.per_category[category.index()];
                CategorySnapshot {
                    category,
                    attempts: counters.attempts.load(Ordering::Relaxed),
                    retries: counters.retries.load(Ordering::Relaxed),
                    successes_after_retry: counters.successes_after_retry.load(Ordering::Relaxed),
                    permanent_failures: counters.permanent_failures.load(Ordering::Relaxed),
                }
            })
            .collect::<Vec<_>>();

        let total = |f: fn(&CategorySnapshot) -> u64| categories.iter().map(f).sum();
        StatsSnapshot {
            total_attempts: total(|c| c.attempts),
            total_retries: total(|c| c.retries),
            total_successes_after_retry: total(|c| c.successes_after_retry),
            total_permanent_failures: total(|c| c.permanent_failures),
            categories,
        }
    }
}

/// Counter values for a single operation category.
#[derive(Debug, Clone, Serialize)]
pub struct CategorySnapshot {
    /// The operation category.
    pub category: OpCategory,
    /// Total attempts, first tries included.
    pub attempts: u64,
    /// Retries scheduled after transient failures.
    pub retries: u64,
    /// Operations that succeeded after at least one retry.
    pub successes_after_retry: u64,
    /// Terminal failures (permanent class or exhausted budget).
    pub permanent_failures: u64,
}

/// Point-in-time view of all retry counters.
#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
    /// Sum of attempts across categories.
    pub total_attempts: u64,
    /// Sum of retries across categories.
    pub total_retries: u64,
    /// Sum of successes-after-retry across categories.
    pub total_successes_after_retry: u64,
    /// Sum of terminal failures across categories.
    pub total_permanent_failures: u64,
    /// Per-category breakdown.
    pub categories: Vec<CategorySnapshot>,
}

impl StatsSnapshot {
    /// Counter row for one category.
    #[must_use]
    pub fn category(&self, category: OpCategory) -> Option<&CategorySnapshot> {
        self.categories.iter().find(|c| c.category == category)
    }
}
