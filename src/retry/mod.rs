//! Bounded retry for durable-store operations.
//!
//! Wraps any fallible store operation with exponential backoff and jitter,
//! classifying each failure as transient or permanent. All attempts feed
//! the process-wide [`RetryStats`] counters.

pub mod backoff;
pub mod executor;
pub mod stats;

pub use executor::{classify_store_error, FailureKind, RetryExecutor};
pub use stats::{OpCategory, RetryStats, StatsSnapshot};
