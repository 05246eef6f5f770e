//! Exponential backoff delay calculation with jitter.

use crate::config::RetryConfig;

/// Calculate the backoff delay before the next attempt.
///
/// Formula: `min(max_delay, base_delay * multiplier^attempt)` with
/// symmetric jitter applied afterwards. `random` must be a sample in
/// `[0.0, 1.0)`; it maps onto `[-jitter_factor, +jitter_factor]`, so a
/// jitter factor of 0.2 varies the capped delay by ±20%.
///
/// `attempt` is zero-based: 0 for the delay after the first failure.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss
)]
pub fn backoff_delay_ms(attempt: u32, config: &RetryConfig, random: f64) -> u64 {
    let exponential =
        (config.base_delay_ms as f64) * config.multiplier.powi(attempt.min(63) as i32);
    let capped = exponential.min(config.max_delay_ms as f64);

    // Map random [0,1) to [-jitter, +jitter].
    let jitter = 1.0 + (random * 2.0 - 1.0) * config.jitter_factor;
    (capped * jitter).round().max(0.0) as u64
}
