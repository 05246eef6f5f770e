//! Notification preference model.
//!
//! Owned by the notification collaborator; this crate only reads it to
//! decide whether a `notify` action accompanies a pause.

use serde::{Deserialize, Serialize};

/// Per-project notification routing preference.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct NotificationPreference {
    /// Unique record identifier.
    pub id: String,
    /// Project the preference applies to.
    pub project_id: String,
    /// Delivery channel identifier.
    pub channel: String,
    /// Whether pauses in this project should notify at all.
    pub notify_on_pause: bool,
}
