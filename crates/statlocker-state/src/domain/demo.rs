//! Smart Demo Rules and Store
//!
//! Guided feature walkthroughs are shown at most meaningfully once per type
//! per user. Eligibility is a pure rule table over the demo type, the
//! athlete's experience level (derived from games played), and onboarding
//! completion; the seen-map is mirrored to storage under `smart_demo_state`.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::infra::kv::KeyValueStore;
use crate::KEY_SMART_DEMO_STATE;

/// The four demo walkthrough types. Serialized names are the wire strings
/// of the storage contract.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum DemoType {
    GameTracking,
    CollegePipeline,
    ProfileFeatures,
    SkillsDrills,
}

impl DemoType {
    /// All demo types, in rule-table order
    pub const ALL: [DemoType; 4] = [
        DemoType::GameTracking,
        DemoType::CollegePipeline,
        DemoType::ProfileFeatures,
        DemoType::SkillsDrills,
    ];

    /// The wire string for this demo type
    pub fn as_str(self) -> &'static str {
        match self {
            DemoType::GameTracking => "game_tracking",
            DemoType::CollegePipeline => "college_pipeline",
            DemoType::ProfileFeatures => "profile_features",
            DemoType::SkillsDrills => "skills_drills",
        }
    }
}

/// Unknown wire string for a demo type. Unknown types are never eligible;
/// rejecting them at the parse boundary keeps the typed rule table total.
#[derive(Debug, thiserror::Error)]
#[error("unknown demo type: {0}")]
pub struct UnknownDemoType(String);

impl FromStr for DemoType {
    type Err = UnknownDemoType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "game_tracking" => Ok(DemoType::GameTracking),
            "college_pipeline" => Ok(DemoType::CollegePipeline),
            "profile_features" => Ok(DemoType::ProfileFeatures),
            "skills_drills" => Ok(DemoType::SkillsDrills),
            other => Err(UnknownDemoType(other.to_string())),
        }
    }
}

/// Experience level derived from the athlete's games-played count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    New,
    Beginner,
    Experienced,
}

impl ExperienceLevel {
    /// `0 -> New`, `1..=3 -> Beginner`, `>=4 -> Experienced`
    pub fn from_games_played(games: u32) -> Self {
        match games {
            0 => ExperienceLevel::New,
            1..=3 => ExperienceLevel::Beginner,
            _ => ExperienceLevel::Experienced,
        }
    }
}

/// The eligibility rule table. A demo already seen is never shown again;
/// otherwise each type has its own audience.
pub fn should_show_demo(
    demo: DemoType,
    level: ExperienceLevel,
    onboarding_completed: bool,
    already_seen: bool,
) -> bool {
    if already_seen {
        return false;
    }
    match demo {
        DemoType::GameTracking => {
            matches!(level, ExperienceLevel::New | ExperienceLevel::Beginner)
        }
        DemoType::CollegePipeline => {
            matches!(level, ExperienceLevel::Beginner | ExperienceLevel::Experienced)
        }
        DemoType::ProfileFeatures => level == ExperienceLevel::New || !onboarding_completed,
        DemoType::SkillsDrills => true,
    }
}

/// The persisted demo seen-state aggregate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoSeenState {
    /// Seen flag per demo type; all four keys are always present
    pub has_seen_demo: BTreeMap<DemoType, bool>,
    /// When a demo was last shown
    pub last_demo_shown: Option<DateTime<Utc>>,
    /// How many demos have been shown in total
    pub demo_count: u32,
}

impl Default for DemoSeenState {
    fn default() -> Self {
        Self {
            has_seen_demo: DemoType::ALL.iter().map(|d| (*d, false)).collect(),
            last_demo_shown: None,
            demo_count: 0,
        }
    }
}

impl DemoSeenState {
    /// Whether the demo type has been seen
    pub fn has_seen(&self, demo: DemoType) -> bool {
        self.has_seen_demo.get(&demo).copied().unwrap_or(false)
    }
}

/// Store owning the demo seen-state and the transient active demo
pub struct DemoStore {
    storage: Arc<dyn KeyValueStore>,
    state: RwLock<DemoSeenState>,
    /// The demo currently being shown, in-memory only
    active: RwLock<Option<DemoType>>,
}

impl DemoStore {
    /// Create a store over a storage backend
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            storage,
            state: RwLock::new(DemoSeenState::default()),
            active: RwLock::new(None),
        }
    }

    /// Load the persisted seen-state, falling back to the all-false default
    /// on any read or parse failure
    pub async fn initialize(&self) {
        match self.storage.get(KEY_SMART_DEMO_STATE).await {
            Ok(Some(blob)) => match serde_json::from_str::<DemoSeenState>(&blob) {
                Ok(loaded) => {
                    debug!(demo_count = loaded.demo_count, "loaded demo seen-state");
                    *self.state.write() = loaded;
                }
                Err(e) => {
                    warn!(error = %e, "stored demo state unparseable, using defaults");
                    *self.state.write() = DemoSeenState::default();
                }
            },
            Ok(None) => {
                *self.state.write() = DemoSeenState::default();
            }
            Err(e) => {
                warn!(error = %e, "failed to load demo state, using defaults");
                *self.state.write() = DemoSeenState::default();
            }
        }
    }

    /// Whether the demo is eligible right now, per the rule table and the
    /// stored seen-map
    pub fn should_show(
        &self,
        demo: DemoType,
        level: ExperienceLevel,
        onboarding_completed: bool,
    ) -> bool {
        let seen = self.state.read().has_seen(demo);
        should_show_demo(demo, level, onboarding_completed, seen)
    }

    /// Set the active demo only if it is eligible. Returns whether it was
    /// triggered.
    pub fn trigger_demo(
        &self,
        demo: DemoType,
        level: ExperienceLevel,
        onboarding_completed: bool,
    ) -> bool {
        if !self.should_show(demo, level, onboarding_completed) {
            return false;
        }
        debug!(demo = demo.as_str(), "triggering demo");
        *self.active.write() = Some(demo);
        true
    }

    /// Mark the demo seen, stamp the shown time, bump the counter, persist,
    /// and clear the active demo
    pub async fn complete_demo(&self, demo: DemoType) {
        {
            let mut state = self.state.write();
            state.has_seen_demo.insert(demo, true);
            state.last_demo_shown = Some(Utc::now());
            state.demo_count += 1;
        }
        *self.active.write() = None;
        self.persist().await;
    }

    /// Clear the active demo without marking it seen
    pub fn close_demo(&self) {
        *self.active.write() = None;
    }

    /// Restore the all-false map and persist it, overwriting any stored value
    pub async fn reset(&self) {
        *self.state.write() = DemoSeenState::default();
        *self.active.write() = None;
        self.persist().await;
    }

    /// The demo currently being shown, if any
    pub fn active_demo(&self) -> Option<DemoType> {
        *self.active.read()
    }

    /// Snapshot of the seen-state aggregate
    pub fn snapshot(&self) -> DemoSeenState {
        self.state.read().clone()
    }

    async fn persist(&self) {
        let payload = {
            let state = self.state.read();
            serde_json::to_string(&*state)
        };
        match payload {
            Ok(json) => {
                if let Err(e) = self.storage.set(KEY_SMART_DEMO_STATE, &json).await {
                    warn!(error = %e, "failed to persist demo state");
                }
            }
            Err(e) => {
                warn!(error = %e, "failed to serialize demo state");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::kv::MemoryKvStore;

    #[test]
    fn test_experience_level_derivation() {
        assert_eq!(ExperienceLevel::from_games_played(0), ExperienceLevel::New);
        assert_eq!(ExperienceLevel::from_games_played(1), ExperienceLevel::Beginner);
        assert_eq!(ExperienceLevel::from_games_played(3), ExperienceLevel::Beginner);
        assert_eq!(ExperienceLevel::from_games_played(4), ExperienceLevel::Experienced);
        assert_eq!(ExperienceLevel::from_games_played(40), ExperienceLevel::Experienced);
    }

    #[test]
    fn test_seen_is_never_eligible() {
        for demo in DemoType::ALL {
            for level in [
                ExperienceLevel::New,
                ExperienceLevel::Beginner,
                ExperienceLevel::Experienced,
            ] {
                assert!(!should_show_demo(demo, level, false, true));
                assert!(!should_show_demo(demo, level, true, true));
            }
        }
    }

    #[test]
    fn test_skills_drills_always_eligible_when_unseen() {
        for level in [
            ExperienceLevel::New,
            ExperienceLevel::Beginner,
            ExperienceLevel::Experienced,
        ] {
            assert!(should_show_demo(DemoType::SkillsDrills, level, true, false));
        }
    }

    #[test]
    fn test_rule_table() {
        use ExperienceLevel::*;
        // game_tracking: new and beginner only
        assert!(should_show_demo(DemoType::GameTracking, New, true, false));
        assert!(should_show_demo(DemoType::GameTracking, Beginner, true, false));
        assert!(!should_show_demo(DemoType::GameTracking, Experienced, true, false));
        // college_pipeline: beginner and experienced only
        assert!(!should_show_demo(DemoType::CollegePipeline, New, true, false));
        assert!(should_show_demo(DemoType::CollegePipeline, Beginner, true, false));
        assert!(should_show_demo(DemoType::CollegePipeline, Experienced, true, false));
        // profile_features: new, or onboarding incomplete
        assert!(should_show_demo(DemoType::ProfileFeatures, New, true, false));
        assert!(should_show_demo(DemoType::ProfileFeatures, Experienced, false, false));
        assert!(!should_show_demo(DemoType::ProfileFeatures, Experienced, true, false));
    }

    #[test]
    fn test_unknown_wire_string_rejected() {
        assert!("game_tracking".parse::<DemoType>().is_ok());
        assert!("super_secret_demo".parse::<DemoType>().is_err());
    }

    #[tokio::test]
    async fn test_trigger_and_complete() {
        let kv = Arc::new(MemoryKvStore::new());
        let store = DemoStore::new(kv.clone());
        store.initialize().await;

        assert!(store.trigger_demo(DemoType::SkillsDrills, ExperienceLevel::New, false));
        assert_eq!(store.active_demo(), Some(DemoType::SkillsDrills));

        store.complete_demo(DemoType::SkillsDrills).await;
        assert_eq!(store.active_demo(), None);

        let snap = store.snapshot();
        assert!(snap.has_seen(DemoType::SkillsDrills));
        assert_eq!(snap.demo_count, 1);
        assert!(snap.last_demo_shown.is_some());

        // Seen demos cannot re-trigger
        assert!(!store.trigger_demo(DemoType::SkillsDrills, ExperienceLevel::New, false));
        assert!(kv.get(KEY_SMART_DEMO_STATE).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_close_does_not_mark_seen() {
        let store = DemoStore::new(Arc::new(MemoryKvStore::new()));
        store.initialize().await;

        store.trigger_demo(DemoType::GameTracking, ExperienceLevel::New, false);
        store.close_demo();

        assert_eq!(store.active_demo(), None);
        assert!(!store.snapshot().has_seen(DemoType::GameTracking));
        // Still eligible
        assert!(store.trigger_demo(DemoType::GameTracking, ExperienceLevel::New, false));
    }

    #[tokio::test]
    async fn test_reset_overwrites_stored_state() {
        let kv = Arc::new(MemoryKvStore::new());
        let store = DemoStore::new(kv.clone());
        store.initialize().await;
        store.complete_demo(DemoType::ProfileFeatures).await;

        store.reset().await;

        let snap = store.snapshot();
        assert!(DemoType::ALL.iter().all(|d| !snap.has_seen(*d)));
        assert_eq!(snap.demo_count, 0);

        let blob = kv.get(KEY_SMART_DEMO_STATE).await.unwrap().unwrap();
        let stored: DemoSeenState = serde_json::from_str(&blob).unwrap();
        assert_eq!(stored.demo_count, 0);
    }

    #[tokio::test]
    async fn test_seen_state_round_trip() {
        let kv = Arc::new(MemoryKvStore::new());

        let first = DemoStore::new(kv.clone());
        first.initialize().await;
        first.complete_demo(DemoType::CollegePipeline).await;
        let before = first.snapshot();

        let second = DemoStore::new(kv);
        second.initialize().await;
        let after = second.snapshot();

        assert_eq!(after.has_seen_demo, before.has_seen_demo);
        assert_eq!(after.last_demo_shown, before.last_demo_shown);
        assert_eq!(after.demo_count, before.demo_count);
    }
}
