//! Error types shared across the crate.

use std::fmt::{Display, Formatter};

/// Shared application result type.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error enumeration covering all domain failure modes.
///
/// Variants map onto the retry taxonomy: [`AppError::DbUnavailable`] is the
/// transient class absorbed by the retry executor, [`AppError::Conflict`]
/// is a store-level uniqueness conflict that call sites resolve (idempotent
/// pause/recovery, checkpoint sequence races), and everything else is
/// permanent and propagates to the caller unchanged.
#[derive(Debug)]
pub enum AppError {
    /// Configuration parsing or validation failure.
    Config(String),
    /// Persistence failure when interacting with `SQLite`.
    Db(String),
    /// Transient store failure (connectivity, timeout, busy/locked).
    DbUnavailable(String),
    /// Unique-constraint violation on insert.
    Conflict(String),
    /// Requested entity does not exist or is already resolved.
    NotFound(String),
    /// Record is not in a state that permits the requested transition.
    InvalidTransition(String),
    /// Referenced checkpoint has been invalidated.
    InvalidCheckpoint(String),
    /// Checkpoint snapshot failed to deserialize.
    CorruptCheckpoint(String),
    /// Retry budget exhausted on a transient failure.
    RetryExhausted(String),
    /// File-system or I/O operation failure.
    Io(String),
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::Db(msg) => write!(f, "db: {msg}"),
            Self::DbUnavailable(msg) => write!(f, "db unavailable: {msg}"),
            Self::Conflict(msg) => write!(f, "conflict: {msg}"),
            Self::NotFound(msg) => write!(f, "not found: {msg}"),
            Self::InvalidTransition(msg) => write!(f, "invalid transition: {msg}"),
            Self::InvalidCheckpoint(msg) => write!(f, "invalid checkpoint: {msg}"),
            Self::CorruptCheckpoint(msg) => write!(f, "corrupt checkpoint: {msg}"),
            Self::RetryExhausted(msg) => write!(f, "retry exhausted: {msg}"),
            Self::Io(msg) => write!(f, "io: {msg}"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(format!("invalid config: {err}"))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) => {
                if db_err.is_unique_violation() {
                    Self::Conflict(db_err.message().to_owned())
                } else if is_transient_message(db_err.message()) {
                    Self::DbUnavailable(db_err.message().to_owned())
                } else {
                    Self::Db(db_err.message().to_owned())
                }
            }
            sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                Self::DbUnavailable(err.to_string())
            }
            _ => Self::Db(err.to_string()),
        }
    }
}

/// `SQLite` reports lock contention as a plain database error; match on the
/// message since sqlx exposes no dedicated variant for it.
fn is_transient_message(msg: &str) -> bool {
    let lower = msg.to_lowercase();
    lower.contains("locked") || lower.contains("busy") || lower.contains("timed out")
}
