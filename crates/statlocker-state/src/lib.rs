//! # StatLocker State
//!
//! Client-side state engine for the StatLocker sports-tracking app: the
//! stores behind the UI layer, each owning exactly one aggregate and
//! mirroring it write-through to an async key-value store.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                      StateContext                        │
//! │  ┌───────────┐ ┌───────────┐ ┌────────────┐ ┌─────────┐ │
//! │  │ Progress  │ │   Game    │ │Gamification│ │  Demo   │ │
//! │  │   Store   │ │  Session  │ │   Store    │ │  Store  │ │
//! │  └─────┬─────┘ └───────────┘ └─────┬──────┘ └────┬────┘ │
//! │        │          (in-memory)      │             │      │
//! │        │                    ┌──────┴──────┐      │      │
//! │        │                    │  leveling   │      │      │
//! │        │                    │ (pure math) │      │      │
//! │        │                    └─────────────┘      │      │
//! │  ┌─────┴────────────────────────────────────────┴────┐  │
//! │  │              KeyValueStore (async trait)          │  │
//! │  │         MemoryKvStore  /  FileKvStore             │  │
//! │  └───────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Persistence contract
//!
//! Persistence is a best-effort write-through cache, not the source of truth
//! for the running session: every mutation applies in memory first, then
//! persists; storage failures are logged and swallowed, so state behaves
//! correctly for the session but may not survive a restart.

pub mod config;
pub mod context;
pub mod domain;
pub mod infra;

// Re-export core types
pub use config::StateConfig;
pub use context::StateContext;
pub use domain::demo::{
    should_show_demo, DemoSeenState, DemoStore, DemoType, ExperienceLevel,
};
pub use domain::gamification::{
    Badge, GamificationEvent, GamificationState, GamificationStore, OnboardingKind, Quest,
    XpReward,
};
pub use domain::progress::{ProgressStore, TaskProgress, UserProgress};
pub use domain::session::{GamePhase, GameSessionStore, GameState};

// Re-export infrastructure
pub use infra::kv::{FileKvStore, KeyValueStore, MemoryKvStore};

/// Post-game window: how long after a tracked game ends the UI offers the
/// post-game action set (2 hours)
pub const POST_GAME_WINDOW_SECS: u64 = 2 * 60 * 60;

/// Base storage key for the user progress aggregate; suffixed with
/// `_<user_id>` when a user id is present
pub const KEY_USER_PROGRESS: &str = "user_progress";

/// Storage key for the smart demo seen-state aggregate
pub const KEY_SMART_DEMO_STATE: &str = "smart_demo_state";

/// Ad-hoc onboarding keys cleared in bulk on reset
pub const ONBOARDING_KEYS: [&str; 3] = [
    "onboarding_firstName",
    "onboarding_lastName",
    "onboarding_profileImage",
];
