//! Startup flows: config file loading and file-backed store bootstrap.

use session_warden::config::GlobalConfig;
use session_warden::models::pause::PauseType;
use session_warden::orchestrator::{InterventionManager, PauseRequest};
use session_warden::persistence::db;

use super::test_helpers::{executor, init_tracing, intervention_config};

fn write_config(dir: &tempfile::TempDir) -> std::path::PathBuf {
    init_tracing();
    let db_path = dir.path().join("data").join("warden.db");
    let config_path = dir.path().join("config.toml");
    let toml = format!(
        "db_path = '{}'\n\n[retry]\nmax_attempts = 2\nbase_delay_ms = 0\nmax_delay_ms = 0\n",
        db_path.display()
    );
    std::fs::write(&config_path, toml).expect("write config");
    config_path
}

#[tokio::test]
async fn config_file_drives_file_backed_store() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config_path = write_config(&dir);

    let config = GlobalConfig::load_from_path(&config_path).expect("load config");
    assert_eq!(config.retry.max_attempts, 2);

    // Parent directory is created on demand.
    let pool = db::connect(&config).await.expect("connect");
    assert!(config.db_path.exists());

    let manager = InterventionManager::new(pool, executor(), intervention_config());
    let outcome = manager
        .pause(PauseRequest {
            session_id: "sess-1".into(),
            project_id: "proj-1".into(),
            reason: "manual block flag set by operator".into(),
            pause_type: PauseType::Manual,
            current_task_ref: None,
        })
        .await
        .expect("pause");
    assert!(outcome.was_created());
}

#[tokio::test]
async fn state_survives_reconnect() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = GlobalConfig::load_from_path(write_config(&dir)).expect("load config");

    let record_id = {
        let pool = db::connect(&config).await.expect("first connect");
        let manager = InterventionManager::new(pool.clone(), executor(), intervention_config());
        let outcome = manager
            .pause(PauseRequest {
                session_id: "sess-1".into(),
                project_id: "proj-1".into(),
                reason: "error rate threshold exceeded".into(),
                pause_type: PauseType::ErrorThreshold,
                current_task_ref: Some("task-1".into()),
            })
            .await
            .expect("pause");
        let id = outcome.record().id.clone();
        pool.close().await;
        id
    };

    // A fresh pool over the same file sees the unresolved pause.
    let pool = db::connect(&config).await.expect("second connect");
    let manager = InterventionManager::new(pool, executor(), intervention_config());
    let active = manager.active_interventions().await.expect("active");
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, record_id);

    manager.resume(&record_id, "operator").await.expect("resume");
    assert!(manager
        .active_interventions()
        .await
        .expect("active")
        .is_empty());
}

#[tokio::test]
async fn schema_bootstrap_is_idempotent() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = GlobalConfig::load_from_path(write_config(&dir)).expect("load config");

    let first = db::connect(&config).await.expect("first connect");
    first.close().await;
    // Reconnecting re-applies the schema without error.
    let second = db::connect(&config).await.expect("second connect");
    second.close().await;
}

#[tokio::test]
async fn missing_config_file_is_config_error() {
    let err = GlobalConfig::load_from_path("/nonexistent/config.toml").expect_err("must fail");
    assert!(matches!(err, session_warden::AppError::Config(_)));
}
