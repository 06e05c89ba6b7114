//! Application-wide alert banners.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use rally_core::types::AlertId;

/// A banner shown to every user while active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    /// Alert ID.
    pub id: AlertId,
    /// Short title.
    pub name: String,
    /// Body.
    pub content: String,
    /// Severity: `info`, `warning`, `danger`.
    pub level: String,
    /// Shown to users.
    pub active: bool,
    /// Users may close it.
    pub dismissible: bool,
    /// When the alert was created.
    pub created_at: DateTime<Utc>,
}
