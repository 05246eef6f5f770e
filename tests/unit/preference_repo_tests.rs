//! Unit tests for the read-only notification preference repository.

use session_warden::persistence::{db, PreferenceRepo, SqlitePool};

async fn seed(pool: &SqlitePool, project_id: &str, channel: &str, notify_on_pause: bool) {
    sqlx::query(
        "INSERT INTO notification_preference (id, project_id, channel, notify_on_pause)
         VALUES (?1, ?2, ?3, ?4)",
    )
    .bind(format!("pref-{project_id}"))
    .bind(project_id)
    .bind(channel)
    .bind(i64::from(notify_on_pause))
    .execute(pool)
    .await
    .expect("seed preference");
}

#[tokio::test]
async fn missing_preference_is_none() {
    let pool = db::connect_memory().await.expect("connect");
    let repo = PreferenceRepo::new(pool);
    assert!(repo
        .get_for_project("proj-1")
        .await
        .expect("query")
        .is_none());
}

#[tokio::test]
async fn configured_preference_round_trips() {
    let pool = db::connect_memory().await.expect("connect");
    seed(&pool, "proj-1", "C123", true).await;
    let repo = PreferenceRepo::new(pool);

    let pref = repo
        .get_for_project("proj-1")
        .await
        .expect("query")
        .expect("must exist");
    assert_eq!(pref.project_id, "proj-1");
    assert_eq!(pref.channel, "C123");
    assert!(pref.notify_on_pause);
}

#[tokio::test]
async fn opted_out_preference_reads_false() {
    let pool = db::connect_memory().await.expect("connect");
    seed(&pool, "proj-2", "C456", false).await;
    let repo = PreferenceRepo::new(pool);

    let pref = repo
        .get_for_project("proj-2")
        .await
        .expect("query")
        .expect("must exist");
    assert!(!pref.notify_on_pause);
}
