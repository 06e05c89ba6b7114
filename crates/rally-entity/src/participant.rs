//! Session membership record.

use serde::{Deserialize, Serialize};

use rally_core::types::UserId;

/// Persisted membership of a user in a session.
///
/// Distinct from a live connection: `active` mirrors whether at least one
/// connection is currently registered, `abandoned` is set when the user
/// leaves permanently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    /// Member's user ID.
    pub user_id: UserId,
    /// Display name.
    pub name: String,
    /// Currently connected.
    pub active: bool,
    /// Permanently left the session.
    pub abandoned: bool,
    /// Watches without voting.
    pub spectator: bool,
}

impl Participant {
    /// A fresh, not yet connected member.
    pub fn new(user_id: UserId, name: impl Into<String>) -> Self {
        Self {
            user_id,
            name: name.into(),
            active: false,
            abandoned: false,
            spectator: false,
        }
    }

    /// Counted toward vote completeness.
    pub fn is_eligible_voter(&self) -> bool {
        self.active && !self.spectator && !self.abandoned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eligibility() {
        let mut p = Participant::new(UserId::new(), "Ada");
        assert!(!p.is_eligible_voter());

        p.active = true;
        assert!(p.is_eligible_voter());

        p.spectator = true;
        assert!(!p.is_eligible_voter());
    }
}
