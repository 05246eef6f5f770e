//! `SQLite` connection pool setup and schema bootstrap.

use std::fs;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::{AppError, GlobalConfig, Result};

use super::schema;

/// Connect to the file-backed `SQLite` database and apply the schema.
///
/// Creates the parent directory and database file if missing.
///
/// # Errors
///
/// Returns `AppError::Io` if the directory cannot be created, or
/// `AppError::Db` if the connection or schema application fails.
pub async fn connect(config: &GlobalConfig) -> Result<SqlitePool> {
    if let Some(parent) = config.db_path.parent() {
        fs::create_dir_all(parent)
            .map_err(|err| AppError::Io(format!("failed to create db dir: {err}")))?;
    }

    let options = SqliteConnectOptions::new()
        .filename(&config.db_path)
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new().connect_with(options).await?;
    schema::bootstrap_schema(&pool).await?;
    Ok(pool)
}

/// Connect to an in-memory `SQLite` database for tests.
///
/// A single connection keeps every query on the same in-memory instance.
///
/// # Errors
///
/// Returns `AppError::Db` if the connection or schema application fails.
pub async fn connect_memory() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;
    schema::bootstrap_schema(&pool).await?;
    Ok(pool)
}
