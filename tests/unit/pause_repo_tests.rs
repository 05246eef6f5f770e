//! Unit tests for the pause registry repository.

use session_warden::models::pause::{InterventionAction, PausedSession, PauseType};
use session_warden::persistence::{db, PauseRepo};
use session_warden::AppError;

fn pause(session_id: &str) -> PausedSession {
    PausedSession::new(
        session_id.to_owned(),
        "proj-1".to_owned(),
        "error rate threshold exceeded".to_owned(),
        PauseType::ErrorThreshold,
        Some("task-2".to_owned()),
    )
}

async fn repo() -> PauseRepo {
    let pool = db::connect_memory().await.expect("connect");
    PauseRepo::new(pool)
}

#[tokio::test]
async fn create_and_get_round_trips() {
    let repo = repo().await;
    let record = pause("sess-1");

    repo.create_with_actions(&record, &[]).await.expect("create");
    let fetched = repo
        .get_by_id(&record.id)
        .await
        .expect("get")
        .expect("must exist");
    assert_eq!(fetched, record);
}

#[tokio::test]
async fn get_missing_is_none() {
    let repo = repo().await;
    assert!(repo.get_by_id("nope").await.expect("get").is_none());
}

#[tokio::test]
async fn actions_persist_with_the_pause() {
    let repo = repo().await;
    let record = pause("sess-1");
    let actions = vec![
        InterventionAction::new(
            record.id.clone(),
            "notify".into(),
            Some(serde_json::json!({ "channel": "C123" })),
        ),
        InterventionAction::new(record.id.clone(), "halt".into(), None),
    ];

    repo.create_with_actions(&record, &actions)
        .await
        .expect("create");

    let stored = repo.list_actions(&record.id).await.expect("list");
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0].action_type, "notify");
    assert_eq!(
        stored[0]
            .payload
            .as_ref()
            .and_then(|p| p["channel"].as_str()),
        Some("C123")
    );
    assert_eq!(stored[1].action_type, "halt");
    assert!(stored[1].payload.is_none());
}

#[tokio::test]
async fn second_unresolved_pause_conflicts() {
    let repo = repo().await;
    repo.create_with_actions(&pause("sess-1"), &[])
        .await
        .expect("first create");

    let err = repo
        .create_with_actions(&pause("sess-1"), &[])
        .await
        .expect_err("must conflict");
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn conflict_rolls_back_actions_too() {
    let repo = repo().await;
    repo.create_with_actions(&pause("sess-1"), &[])
        .await
        .expect("first create");

    let second = pause("sess-1");
    let action = InterventionAction::new(second.id.clone(), "halt".into(), None);
    repo.create_with_actions(&second, &[action])
        .await
        .expect_err("must conflict");

    assert!(repo.list_actions(&second.id).await.expect("list").is_empty());
}

#[tokio::test]
async fn resolve_clears_the_unresolved_slot() {
    let repo = repo().await;
    let record = pause("sess-1");
    repo.create_with_actions(&record, &[]).await.expect("create");

    let rows = repo.resolve(&record.id, "operator").await.expect("resolve");
    assert_eq!(rows, 1);

    let resolved = repo
        .get_by_id(&record.id)
        .await
        .expect("get")
        .expect("must exist");
    assert!(resolved.resolved);
    assert!(resolved.resolved_at.is_some());
    assert_eq!(resolved.resolved_by.as_deref(), Some("operator"));

    // Slot is free again for a fresh pause.
    repo.create_with_actions(&pause("sess-1"), &[])
        .await
        .expect("second create after resolve");
}

#[tokio::test]
async fn resolve_is_single_shot() {
    let repo = repo().await;
    let record = pause("sess-1");
    repo.create_with_actions(&record, &[]).await.expect("create");

    assert_eq!(repo.resolve(&record.id, "a").await.expect("first"), 1);
    assert_eq!(repo.resolve(&record.id, "b").await.expect("second"), 0);

    let stored = repo
        .get_by_id(&record.id)
        .await
        .expect("get")
        .expect("must exist");
    assert_eq!(stored.resolved_by.as_deref(), Some("a"));
}

#[tokio::test]
async fn unresolved_lookup_ignores_resolved_records() {
    let repo = repo().await;
    let first = pause("sess-1");
    repo.create_with_actions(&first, &[]).await.expect("create");
    repo.resolve(&first.id, "operator").await.expect("resolve");

    assert!(repo
        .get_unresolved_for_session("sess-1")
        .await
        .expect("lookup")
        .is_none());

    let second = pause("sess-1");
    repo.create_with_actions(&second, &[])
        .await
        .expect("second create");
    let unresolved = repo
        .get_unresolved_for_session("sess-1")
        .await
        .expect("lookup")
        .expect("must exist");
    assert_eq!(unresolved.id, second.id);
}

#[tokio::test]
async fn list_unresolved_spans_sessions() {
    let repo = repo().await;
    let a = pause("sess-a");
    let b = pause("sess-b");
    repo.create_with_actions(&a, &[]).await.expect("create a");
    repo.create_with_actions(&b, &[]).await.expect("create b");
    repo.resolve(&a.id, "operator").await.expect("resolve a");

    let unresolved = repo.list_unresolved().await.expect("list");
    assert_eq!(unresolved.len(), 1);
    assert_eq!(unresolved[0].id, b.id);
}

#[tokio::test]
async fn session_history_keeps_resolved_records() {
    let repo = repo().await;
    let first = pause("sess-1");
    repo.create_with_actions(&first, &[]).await.expect("create");
    repo.resolve(&first.id, "operator").await.expect("resolve");
    let second = pause("sess-1");
    repo.create_with_actions(&second, &[])
        .await
        .expect("second create");

    let history = repo.list_for_session("sess-1").await.expect("list");
    assert_eq!(history.len(), 2);
    assert!(history[0].resolved);
    assert!(!history[1].resolved);
}
