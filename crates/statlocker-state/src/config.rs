//! State engine configuration

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::POST_GAME_WINDOW_SECS;

/// State engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateConfig {
    /// How long the post-game window stays open after a game ends
    pub post_game_window_secs: u64,
    /// Root directory for file-backed storage, `None` for in-memory only
    pub storage_dir: Option<String>,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            post_game_window_secs: POST_GAME_WINDOW_SECS,
            storage_dir: None,
        }
    }
}

impl StateConfig {
    /// Load configuration from environment and `.env` file
    pub fn load() -> Result<Self> {
        // Try to load .env file
        let _ = dotenvy::dotenv();

        let mut cfg = Self::default();

        if let Ok(val) = std::env::var("STATLOCKER_POST_GAME_WINDOW_SECS") {
            if let Ok(v) = val.parse() {
                cfg.post_game_window_secs = v;
            }
        }
        if let Ok(dir) = std::env::var("STATLOCKER_STORAGE_DIR") {
            if !dir.is_empty() {
                cfg.storage_dir = Some(dir);
            }
        }

        Ok(cfg)
    }

    /// The post-game window as a [`Duration`]
    pub fn post_game_window(&self) -> Duration {
        Duration::from_secs(self.post_game_window_secs)
    }
}
