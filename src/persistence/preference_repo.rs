//! Read-only access to notification preferences.
//!
//! The table is owned by the notification collaborator; this crate never
//! writes it.

use sqlx::SqlitePool;

use crate::models::preference::NotificationPreference;
use crate::Result;

/// Read-only repository for notification preferences.
#[derive(Clone)]
pub struct PreferenceRepo {
    pool: SqlitePool,
}

/// Internal row struct for `SQLite` deserialization.
#[derive(sqlx::FromRow)]
struct PreferenceRow {
    id: String,
    project_id: String,
    channel: String,
    notify_on_pause: i64,
}

impl PreferenceRow {
    fn into_preference(self) -> NotificationPreference {
        NotificationPreference {
            notify_on_pause: self.notify_on_pause != 0,
            id: self.id,
            project_id: self.project_id,
            channel: self.channel,
        }
    }
}

impl PreferenceRepo {
    /// Create a new repository instance.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Retrieve the preference for a project, if one is configured.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn get_for_project(&self, project_id: &str) -> Result<Option<NotificationPreference>> {
        let row: Option<PreferenceRow> = sqlx::query_as(
            "SELECT * FROM notification_preference WHERE project_id = ?1 LIMIT 1",
        )
        .bind(project_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(PreferenceRow::into_preference))
    }
}
