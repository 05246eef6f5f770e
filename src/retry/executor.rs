//! Retry executor combinator for durable-store operations.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tracing::warn;

use crate::config::RetryConfig;
use crate::{AppError, Result};

use super::backoff::backoff_delay_ms;
use super::stats::{OpCategory, RetryStats};

/// Classification of a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Worth retrying: the store may recover on its own.
    Transient,
    /// Retrying cannot help; propagate immediately.
    Permanent,
}

/// Default classifier for durable-store failures.
///
/// Only [`AppError::DbUnavailable`] is transient. Constraint conflicts are
/// permanent here; call sites that expect a conflict (checkpoint sequence
/// races) pass their own classifier to [`RetryExecutor::execute_with`].
#[must_use]
pub fn classify_store_error(err: &AppError) -> FailureKind {
    match err {
        AppError::DbUnavailable(_) => FailureKind::Transient,
        _ => FailureKind::Permanent,
    }
}

/// Wraps fallible store operations with bounded, jittered retry.
///
/// The executor is a composition primitive: it takes an operation closure
/// and a classification function and runs the operation until success, a
/// permanent failure, or budget exhaustion. Classification always applies
/// to the latest failure, so an operation that fails differently across
/// attempts is judged by what it did last.
#[derive(Clone)]
pub struct RetryExecutor {
    config: RetryConfig,
    stats: Arc<RetryStats>,
}

impl RetryExecutor {
    /// Create an executor sharing the process-wide statistics.
    #[must_use]
    pub fn new(config: RetryConfig, stats: Arc<RetryStats>) -> Self {
        Self { config, stats }
    }

    /// The shared statistics handle.
    #[must_use]
    pub fn stats(&self) -> &Arc<RetryStats> {
        &self.stats
    }

    /// Execute `op` with the default store-error classifier.
    ///
    /// # Errors
    ///
    /// Propagates permanent failures unchanged; returns
    /// `AppError::RetryExhausted` when the attempt budget runs out, and
    /// `AppError::Config` if the budget is zero.
    pub async fn execute<T, F, Fut>(&self, category: OpCategory, op: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.execute_with(category, op, classify_store_error).await
    }

    /// Execute `op`, classifying each failure with `classify`.
    ///
    /// The backoff sleep between attempts is a tokio cancellation point:
    /// dropping the returned future abandons further retries without
    /// interrupting an attempt already in flight.
    ///
    /// # Errors
    ///
    /// Propagates permanent failures unchanged; returns
    /// `AppError::RetryExhausted` when the attempt budget runs out, and
    /// `AppError::Config` if the budget is zero.
    pub async fn execute_with<T, F, Fut, C>(
        &self,
        category: OpCategory,
        op: F,
        classify: C,
    ) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
        C: Fn(&AppError) -> FailureKind,
    {
        if self.config.max_attempts == 0 {
            return Err(AppError::Config(
                "retry.max_attempts must be greater than zero".into(),
            ));
        }

        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            self.stats.record_attempt(category);

            let err = match op().await {
                Ok(value) => {
                    if attempt > 1 {
                        self.stats.record_success_after_retry(category);
                    }
                    return Ok(value);
                }
                Err(err) => err,
            };

            if classify(&err) == FailureKind::Permanent {
                self.stats.record_permanent_failure(category);
                return Err(err);
            }

            if attempt >= self.config.max_attempts {
                self.stats.record_permanent_failure(category);
                return Err(AppError::RetryExhausted(format!(
                    "{} failed after {attempt} attempts: {err}",
                    category.as_str()
                )));
            }

            self.stats.record_retry(category);
            let random = rand::thread_rng().gen::<f64>();
            let delay = backoff_delay_ms(attempt - 1, &self.config, random);
            warn!(
                category = category.as_str(),
                attempt,
                delay_ms = delay,
                error = %err,
                "transient store failure, retrying"
            );
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
    }
}
