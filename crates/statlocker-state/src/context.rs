//! State context: explicit ownership of the four stores
//!
//! The UI layer receives one [`StateContext`] and passes it down instead of
//! reaching for process-wide singletons; tests construct their own context
//! over an in-memory backend.

use std::sync::Arc;
use tracing::{info, warn};

use statlocker_common::AthleteSnapshot;

use crate::config::StateConfig;
use crate::domain::demo::DemoStore;
use crate::domain::gamification::GamificationStore;
use crate::domain::progress::ProgressStore;
use crate::domain::session::GameSessionStore;
use crate::infra::kv::{FileKvStore, KeyValueStore, MemoryKvStore};
use crate::ONBOARDING_KEYS;

/// Owns one instance of each store over a shared storage backend
pub struct StateContext {
    pub progress: ProgressStore,
    pub session: GameSessionStore,
    pub gamification: GamificationStore,
    pub demos: DemoStore,
    storage: Arc<dyn KeyValueStore>,
}

impl StateContext {
    /// Build a context over an explicit storage backend
    pub fn new(storage: Arc<dyn KeyValueStore>, config: &StateConfig) -> Self {
        Self {
            progress: ProgressStore::new(storage.clone()),
            session: GameSessionStore::new(config),
            gamification: GamificationStore::new(),
            demos: DemoStore::new(storage.clone()),
            storage,
        }
    }

    /// Build a context from config: file-backed storage when a storage dir
    /// is configured, in-memory otherwise
    pub fn from_config(config: &StateConfig) -> Self {
        let storage: Arc<dyn KeyValueStore> = match &config.storage_dir {
            Some(dir) => Arc::new(FileKvStore::new(dir)),
            None => Arc::new(MemoryKvStore::new()),
        };
        Self::new(storage, config)
    }

    /// Load persisted aggregates for the resolved user and self-heal a
    /// post-game window left over from a previous run
    pub async fn initialize(&self, user_id: Option<&str>) {
        info!(user_id = user_id.unwrap_or("<anonymous>"), "initializing state context");
        self.progress.initialize(user_id).await;
        self.demos.initialize().await;
        self.session.check_post_game_status();
    }

    /// Initialize for a signed-in athlete, seeding gamification from the
    /// fetched profile snapshot
    pub async fn sign_in(&self, snapshot: &AthleteSnapshot) {
        self.initialize(Some(&snapshot.user_id)).await;
        self.gamification.initialize_from_user(snapshot);
    }

    /// Remove the ad-hoc onboarding keys in one bulk call
    pub async fn clear_onboarding_keys(&self) {
        if let Err(e) = self.storage.multi_remove(&ONBOARDING_KEYS).await {
            warn!(error = %e, "failed to clear onboarding keys");
        }
    }
}
