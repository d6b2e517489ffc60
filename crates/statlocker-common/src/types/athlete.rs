//! AthleteSnapshot - externally fetched view of an athlete's profile
//!
//! The authentication/profile collaborator supplies this snapshot; the state
//! engine reads it to seed the gamification store and to derive demo
//! eligibility from the games-played count. It is read-only from this layer's
//! perspective.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Snapshot of an athlete's profile as fetched from the backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AthleteSnapshot {
    /// Athlete's user id; scopes per-user storage keys
    pub user_id: String,

    /// Cumulative XP total from the profile
    pub total_xp: u32,

    /// Ids of badges the athlete has unlocked
    pub unlocked_badge_ids: Vec<String>,

    /// Whether onboarding has been completed
    pub onboarding_completed: bool,

    /// Number of games the athlete has tracked, drives experience-level
    /// derivation for demo eligibility
    pub games_played: u32,

    /// When the snapshot was fetched
    pub fetched_at: DateTime<Utc>,
}

impl AthleteSnapshot {
    /// Create a fresh snapshot for a brand-new athlete
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            total_xp: 0,
            unlocked_badge_ids: Vec::new(),
            onboarding_completed: false,
            games_played: 0,
            fetched_at: Utc::now(),
        }
    }

    /// Whether the athlete has unlocked the named badge
    pub fn has_badge(&self, badge_id: &str) -> bool {
        self.unlocked_badge_ids.iter().any(|id| id == badge_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_snapshot_is_empty() {
        let snap = AthleteSnapshot::new("athlete-1");
        assert_eq!(snap.total_xp, 0);
        assert!(snap.unlocked_badge_ids.is_empty());
        assert!(!snap.onboarding_completed);
    }

    #[test]
    fn test_has_badge() {
        let mut snap = AthleteSnapshot::new("athlete-1");
        snap.unlocked_badge_ids.push("first_game".to_string());
        assert!(snap.has_badge("first_game"));
        assert!(!snap.has_badge("hat_trick"));
    }

    #[test]
    fn test_round_trip() {
        let snap = AthleteSnapshot::new("athlete-1");
        let json = serde_json::to_string(&snap).unwrap();
        let back: AthleteSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back.user_id, snap.user_id);
        assert_eq!(back.fetched_at, snap.fetched_at);
    }
}
