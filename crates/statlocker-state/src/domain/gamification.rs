//! Gamification Store
//!
//! Owns the XP total, the badge catalog, the append-only XP history, and the
//! ephemeral quest lists. Derived level fields (`current_level`,
//! `level_progress`, `xp_to_next_level`) are pure functions of `total_xp`,
//! recomputed through [`statlocker_leveling`] on every XP change and never
//! stored independently of the XP truth.
//!
//! Level-up and badge-unlock UI signals are modeled as an explicit event
//! queue drained by the UI layer via [`GamificationStore::take_events`].

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use statlocker_common::AthleteSnapshot;
use statlocker_leveling::{calculate_level, calculate_level_progress, xp_to_next_level, LevelTier};

/// Onboarding flavor completed by the athlete
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingKind {
    Quick,
    Extended,
}

impl OnboardingKind {
    /// Badge unlocked when this onboarding flavor completes
    pub fn badge_id(self) -> &'static str {
        match self {
            OnboardingKind::Quick => "onboarding_quick_start",
            OnboardingKind::Extended => "onboarding_extended",
        }
    }
}

/// A badge in the fixed catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Badge {
    /// Unique badge id
    pub id: String,
    /// Display name
    pub name: String,
    /// How the badge is earned
    pub description: String,
    /// Whether the athlete has unlocked it
    pub is_unlocked: bool,
}

impl Badge {
    fn catalog_entry(id: &str, name: &str, description: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            is_unlocked: false,
        }
    }
}

/// A quest offered to the athlete, worth a fixed XP reward on completion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quest {
    /// Unique quest id
    pub id: String,
    /// Display title
    pub title: String,
    /// What to do
    pub description: String,
    /// XP awarded on completion
    pub xp_reward: u32,
    /// Set when the quest completes
    pub completed_at: Option<DateTime<Utc>>,
}

impl Quest {
    /// Create an open quest
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        xp_reward: u32,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            xp_reward,
            completed_at: None,
        }
    }

    /// Whether the quest has completed
    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }
}

/// An entry in the append-only XP history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XpReward {
    /// Record id
    pub id: Uuid,
    /// Signed amount; the contract imposes no lower bound on what callers
    /// supply, the running total saturates at zero
    pub amount: i64,
    /// Why the XP was awarded
    pub reason: String,
    /// When it was awarded
    pub awarded_at: DateTime<Utc>,
}

impl XpReward {
    fn new(amount: i64, reason: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            amount,
            reason: reason.into(),
            awarded_at: Utc::now(),
        }
    }
}

/// UI events raised by gamification mutations, drained by the UI layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GamificationEvent {
    /// The derived level identity changed after an XP mutation
    LevelUp { level: u32, title: &'static str },
    /// A badge flipped from locked to unlocked
    BadgeUnlocked { badge_id: String },
}

/// Snapshot of the gamification aggregate for the UI layer
#[derive(Debug, Clone, Serialize)]
pub struct GamificationState {
    pub total_xp: u32,
    pub current_level: LevelTier,
    pub level_progress: f32,
    pub xp_to_next_level: u32,
    pub badges: Vec<Badge>,
    pub current_quests: Vec<Quest>,
    pub completed_quests: Vec<Quest>,
}

/// The fixed badge catalog. Ids are stable identifiers shared with the
/// backend profile.
fn default_badge_catalog() -> Vec<Badge> {
    vec![
        Badge::catalog_entry("first_game", "First Whistle", "Track your first game"),
        Badge::catalog_entry("hat_trick", "Hat Trick", "Score three goals in one game"),
        Badge::catalog_entry("century_club", "Century Club", "Reach 100 tracked stats"),
        Badge::catalog_entry("season_opener", "Season Opener", "Track a game in a new season"),
        Badge::catalog_entry(
            "onboarding_quick_start",
            "Quick Start",
            "Finish quick onboarding",
        ),
        Badge::catalog_entry(
            "onboarding_extended",
            "Full Kit",
            "Finish extended onboarding",
        ),
    ]
}

struct GamificationInner {
    total_xp: u32,
    badges: Vec<Badge>,
    xp_history: Vec<XpReward>,
    current_quests: Vec<Quest>,
    completed_quests: Vec<Quest>,
    current_level: &'static LevelTier,
    level_progress: f32,
    xp_to_next_level: u32,
    events: Vec<GamificationEvent>,
}

impl GamificationInner {
    fn initial() -> Self {
        Self {
            total_xp: 0,
            badges: default_badge_catalog(),
            xp_history: Vec::new(),
            current_quests: Vec::new(),
            completed_quests: Vec::new(),
            current_level: calculate_level(0),
            level_progress: 0.0,
            xp_to_next_level: xp_to_next_level(0),
            events: Vec::new(),
        }
    }

    /// Re-derive level fields from the XP total
    fn recompute_level(&mut self) {
        self.current_level = calculate_level(self.total_xp);
        self.level_progress = calculate_level_progress(self.total_xp);
        self.xp_to_next_level = xp_to_next_level(self.total_xp);
    }
}

/// Store owning the gamification aggregate. In-memory for the session;
/// seeded from the backend profile via
/// [`initialize_from_user`](Self::initialize_from_user).
pub struct GamificationStore {
    inner: RwLock<GamificationInner>,
}

impl Default for GamificationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl GamificationStore {
    /// Create a store at the zero-XP, all-badges-locked initial snapshot
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(GamificationInner::initial()),
        }
    }

    /// Award XP and append the reward to history. The amount is applied as
    /// supplied (no lower bound); the running total saturates at zero. A
    /// level-up event is queued when the derived level identity changes.
    ///
    /// Returns the created reward record.
    pub fn add_xp(&self, amount: i64, reason: impl Into<String>) -> XpReward {
        let mut inner = self.inner.write();
        let reward = XpReward::new(amount, reason);
        inner.xp_history.push(reward.clone());

        let previous_level = inner.current_level.level;
        let new_total = (inner.total_xp as i64 + amount).clamp(0, u32::MAX as i64) as u32;
        inner.total_xp = new_total;
        inner.recompute_level();

        if inner.current_level.level != previous_level {
            let tier = inner.current_level;
            debug!(level = tier.level, title = tier.title, "level changed");
            inner.events.push(GamificationEvent::LevelUp {
                level: tier.level,
                title: tier.title,
            });
        }
        reward
    }

    /// Unlock a badge by id. Traverses the full badge list; unknown ids
    /// change nothing, re-unlocking is a no-op.
    pub fn unlock_badge(&self, badge_id: &str) {
        let mut inner = self.inner.write();
        let newly_unlocked = inner
            .badges
            .iter_mut()
            .find(|b| b.id == badge_id)
            .map(|badge| {
                let flipped = !badge.is_unlocked;
                badge.is_unlocked = true;
                flipped
            })
            .unwrap_or(false);

        if newly_unlocked {
            debug!(badge_id, "badge unlocked");
            inner.events.push(GamificationEvent::BadgeUnlocked {
                badge_id: badge_id.to_string(),
            });
        }
    }

    /// Replace the active quest list
    pub fn assign_quests(&self, quests: Vec<Quest>) {
        self.inner.write().current_quests = quests;
    }

    /// Complete a quest by id. No-op when the quest is absent from the
    /// active list or already completed. The quest's fixed XP reward routes
    /// through [`add_xp`](Self::add_xp), so history and level update too.
    /// The active-list record is stamped in place and a copy is appended to
    /// the completed list, so the id appears in both afterwards.
    pub fn complete_quest(&self, quest_id: &str) {
        let award = {
            let mut inner = self.inner.write();
            let quest = match inner
                .current_quests
                .iter_mut()
                .find(|q| q.id == quest_id && !q.is_completed())
            {
                Some(q) => q,
                None => return,
            };
            quest.completed_at = Some(Utc::now());
            let completed = quest.clone();
            let award = (completed.xp_reward, completed.title.clone());
            inner.completed_quests.push(completed);
            award
        };

        let (xp, title) = award;
        self.add_xp(xp as i64, format!("Quest completed: {}", title));
    }

    /// Unlock the badge for the completed onboarding flavor and clear all
    /// active and completed quests
    pub fn complete_onboarding(&self, kind: OnboardingKind) {
        self.unlock_badge(kind.badge_id());
        let mut inner = self.inner.write();
        inner.current_quests.clear();
        inner.completed_quests.clear();
    }

    /// Restore the zero-XP, all-badges-locked initial snapshot
    pub fn reset(&self) {
        *self.inner.write() = GamificationInner::initial();
    }

    /// Seed XP and unlocked badges from an externally fetched profile.
    /// Destructive: badges not named in the snapshot are force-locked, and
    /// no UI events are raised for the seeded state.
    pub fn initialize_from_user(&self, snapshot: &AthleteSnapshot) {
        let mut inner = self.inner.write();
        inner.total_xp = snapshot.total_xp;
        for badge in &mut inner.badges {
            badge.is_unlocked = snapshot.unlocked_badge_ids.iter().any(|id| *id == badge.id);
        }
        inner.recompute_level();
        inner.events.clear();
    }

    /// Drain pending UI events
    pub fn take_events(&self) -> Vec<GamificationEvent> {
        std::mem::take(&mut self.inner.write().events)
    }

    /// Current XP total
    pub fn total_xp(&self) -> u32 {
        self.inner.read().total_xp
    }

    /// Append-only XP history
    pub fn xp_history(&self) -> Vec<XpReward> {
        self.inner.read().xp_history.clone()
    }

    /// Snapshot of the full aggregate for the UI layer
    pub fn snapshot(&self) -> GamificationState {
        let inner = self.inner.read();
        GamificationState {
            total_xp: inner.total_xp,
            current_level: *inner.current_level,
            level_progress: inner.level_progress,
            xp_to_next_level: inner.xp_to_next_level,
            badges: inner.badges.clone(),
            current_quests: inner.current_quests.clone(),
            completed_quests: inner.completed_quests.clone(),
        }
    }
}
