//! Unit tests for `GlobalConfig` parsing, defaults, and validation.

use session_warden::config::GlobalConfig;
use session_warden::AppError;

#[test]
fn minimal_config_gets_defaults() {
    let config = GlobalConfig::from_toml_str("db_path = '/tmp/warden.db'").expect("parse");

    assert_eq!(config.retry.max_attempts, 5);
    assert_eq!(config.retry.base_delay_ms, 100);
    assert!((config.retry.multiplier - 2.0).abs() < f64::EPSILON);
    assert_eq!(config.retry.max_delay_ms, 5_000);
    assert!((config.retry.jitter_factor - 0.2).abs() < f64::EPSILON);

    assert_eq!(config.intervention.max_consecutive_retries, 3);
    assert!((config.intervention.error_rate_threshold - 0.5).abs() < f64::EPSILON);
    assert!(config.intervention.blocked_actions.is_empty());
    assert_eq!(config.intervention.pause_actions, vec!["notify", "halt"]);
}

#[test]
fn overrides_are_applied() {
    let toml = r"
db_path = '/tmp/warden.db'

[retry]
max_attempts = 3
base_delay_ms = 50
max_delay_ms = 1000

[intervention]
max_consecutive_retries = 5
error_rate_threshold = 0.8
blocked_actions = ['rm_rf', 'force_push']
pause_actions = ['halt']
";
    let config = GlobalConfig::from_toml_str(toml).expect("parse");

    assert_eq!(config.retry.max_attempts, 3);
    assert_eq!(config.retry.base_delay_ms, 50);
    assert_eq!(config.retry.max_delay_ms, 1000);
    assert_eq!(config.intervention.max_consecutive_retries, 5);
    assert_eq!(
        config.intervention.blocked_actions,
        vec!["rm_rf", "force_push"]
    );
    assert_eq!(config.intervention.pause_actions, vec!["halt"]);
}

#[test]
fn zero_max_attempts_rejected() {
    let toml = "db_path = '/tmp/warden.db'\n[retry]\nmax_attempts = 0";
    let err = GlobalConfig::from_toml_str(toml).expect_err("must fail");
    assert!(matches!(err, AppError::Config(_)));
    assert!(err.to_string().contains("max_attempts"));
}

#[test]
fn sub_one_multiplier_rejected() {
    let toml = "db_path = '/tmp/warden.db'\n[retry]\nmultiplier = 0.5";
    let err = GlobalConfig::from_toml_str(toml).expect_err("must fail");
    assert!(err.to_string().contains("multiplier"));
}

#[test]
fn out_of_range_jitter_rejected() {
    let toml = "db_path = '/tmp/warden.db'\n[retry]\njitter_factor = 1.5";
    let err = GlobalConfig::from_toml_str(toml).expect_err("must fail");
    assert!(err.to_string().contains("jitter_factor"));
}

#[test]
fn out_of_range_error_rate_rejected() {
    let toml = "db_path = '/tmp/warden.db'\n[intervention]\nerror_rate_threshold = 2.0";
    let err = GlobalConfig::from_toml_str(toml).expect_err("must fail");
    assert!(err.to_string().contains("error_rate_threshold"));
}

#[test]
fn invalid_toml_is_config_error() {
    let err = GlobalConfig::from_toml_str("not valid toml [[").expect_err("must fail");
    assert!(matches!(err, AppError::Config(_)));
}
