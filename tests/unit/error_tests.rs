//! Unit tests for error display and sqlx error mapping.

use session_warden::AppError;

#[test]
fn display_includes_category_prefix() {
    assert_eq!(
        AppError::Config("bad field".into()).to_string(),
        "config: bad field"
    );
    assert_eq!(
        AppError::DbUnavailable("locked".into()).to_string(),
        "db unavailable: locked"
    );
    assert_eq!(
        AppError::NotFound("pause record".into()).to_string(),
        "not found: pause record"
    );
    assert_eq!(
        AppError::RetryExhausted("pause after 5 attempts".into()).to_string(),
        "retry exhausted: pause after 5 attempts"
    );
    assert_eq!(
        AppError::CorruptCheckpoint("bad json".into()).to_string(),
        "corrupt checkpoint: bad json"
    );
}

#[test]
fn pool_timeout_maps_to_unavailable() {
    let err = AppError::from(sqlx::Error::PoolTimedOut);
    assert!(matches!(err, AppError::DbUnavailable(_)));
}

#[test]
fn pool_closed_maps_to_unavailable() {
    let err = AppError::from(sqlx::Error::PoolClosed);
    assert!(matches!(err, AppError::DbUnavailable(_)));
}

#[test]
fn row_not_found_maps_to_db() {
    let err = AppError::from(sqlx::Error::RowNotFound);
    assert!(matches!(err, AppError::Db(_)));
}

#[test]
fn toml_error_maps_to_config() {
    let parse_err = toml::from_str::<toml::Value>("= broken").expect_err("must fail");
    let err = AppError::from(parse_err);
    assert!(matches!(err, AppError::Config(_)));
}
