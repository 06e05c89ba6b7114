//! Completion email configuration.

use serde::{Deserialize, Serialize};

/// Settings for the fire-and-forget session summary emails.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Whether a summary is sent when a session reaches `completed`.
    #[serde(default = "default_true")]
    pub completion_emails: bool,
    /// Sender address used by the mailer.
    #[serde(default = "default_sender")]
    pub sender: String,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            completion_emails: true,
            sender: default_sender(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_sender() -> String {
    "rally@localhost".to_string()
}
