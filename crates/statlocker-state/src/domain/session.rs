//! Game Session Store
//!
//! A small state machine for "game in progress / post-game cooldown / idle".
//! After a tracked game ends the store sits in [`GamePhase::PostGame`] for a
//! fixed window (2 hours by default), during which the UI offers a distinct
//! action set. The window closes via a deferred timer armed when the game
//! ends, or via the [`check_post_game_status`](GameSessionStore::check_post_game_status)
//! poll, which self-heals the case where the timer did not survive a restart.
//!
//! The session aggregate is in-memory only; it has no key in the storage
//! namespace.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::StateConfig;

/// The three session phases. At most one of active/post-game holds at any
/// time; the enum makes the states mutually exclusive by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GamePhase {
    /// No game in progress, no pending cooldown
    Idle,
    /// A game is being tracked
    Active {
        game_id: String,
        start_time: DateTime<Utc>,
    },
    /// Cooldown after a game ended
    PostGame { ended_at: DateTime<Utc> },
}

/// Flat snapshot of the session state for the UI layer
#[derive(Debug, Clone, Serialize)]
pub struct GameState {
    pub is_active: bool,
    pub is_post_game: bool,
    pub game_id: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub last_game_end_time: Option<DateTime<Utc>>,
}

struct SessionInner {
    phase: GamePhase,
    /// End time of the most recent game; outlives the post-game window
    last_game_end_time: Option<DateTime<Utc>>,
}

/// Store owning the game session state machine
#[derive(Clone)]
pub struct GameSessionStore {
    inner: Arc<RwLock<SessionInner>>,
    window: Duration,
}

impl GameSessionStore {
    /// Create an idle session store with the configured post-game window
    pub fn new(config: &StateConfig) -> Self {
        Self::with_window(config.post_game_window())
    }

    /// Create an idle session store with an explicit post-game window
    pub fn with_window(window: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(SessionInner {
                phase: GamePhase::Idle,
                last_game_end_time: None,
            })),
            window,
        }
    }

    /// Start tracking a game. Valid from any phase: a new game supersedes a
    /// pending post-game window.
    pub fn start_game(&self, game_id: impl Into<String>) {
        let game_id = game_id.into();
        let mut inner = self.inner.write();
        debug!(game_id = %game_id, from = ?inner.phase, "starting game");
        inner.phase = GamePhase::Active {
            game_id,
            start_time: Utc::now(),
        };
    }

    /// End the active game and enter the post-game window, arming a
    /// deferred expiry for it. No-op when no game is active.
    pub fn end_game(&self) {
        let ended_at = {
            let mut inner = self.inner.write();
            if !matches!(inner.phase, GamePhase::Active { .. }) {
                warn!(phase = ?inner.phase, "end_game called with no active game");
                return;
            }
            let ended_at = Utc::now();
            debug!(ended_at = %ended_at, "game ended, entering post-game window");
            inner.phase = GamePhase::PostGame { ended_at };
            inner.last_game_end_time = Some(ended_at);
            ended_at
        };

        // Deferred expiry, conditional on still being in the same post-game
        // window when it fires: a newer Active state is never stomped.
        let store = self.clone();
        let window = self.window;
        tokio::spawn(async move {
            tokio::time::sleep(window).await;
            store.expire_if_stale(ended_at);
        });
    }

    /// Idempotent poll: force `PostGame -> Idle` when the window has elapsed.
    /// Intended to be invoked on component mount to self-heal after a
    /// restart where the armed timer was lost. Returns the post-check state.
    pub fn check_post_game_status(&self) -> GameState {
        {
            let mut inner = self.inner.write();
            if let GamePhase::PostGame { ended_at } = inner.phase {
                let elapsed = (Utc::now() - ended_at).to_std().unwrap_or_default();
                if elapsed >= self.window {
                    debug!(ended_at = %ended_at, "post-game window overdue, returning to idle");
                    inner.phase = GamePhase::Idle;
                }
            }
        }
        self.snapshot()
    }

    /// Current phase
    pub fn phase(&self) -> GamePhase {
        self.inner.read().phase.clone()
    }

    /// Flat snapshot for the UI layer
    pub fn snapshot(&self) -> GameState {
        let inner = self.inner.read();
        match &inner.phase {
            GamePhase::Idle => GameState {
                is_active: false,
                is_post_game: false,
                game_id: None,
                start_time: None,
                end_time: None,
                last_game_end_time: inner.last_game_end_time,
            },
            GamePhase::Active {
                game_id,
                start_time,
            } => GameState {
                is_active: true,
                is_post_game: false,
                game_id: Some(game_id.clone()),
                start_time: Some(*start_time),
                end_time: None,
                last_game_end_time: inner.last_game_end_time,
            },
            GamePhase::PostGame { ended_at } => GameState {
                is_active: false,
                is_post_game: true,
                game_id: None,
                start_time: None,
                end_time: Some(*ended_at),
                last_game_end_time: inner.last_game_end_time,
            },
        }
    }

    /// Clear the post-game phase only if it still matches the game end the
    /// timer was armed against
    fn expire_if_stale(&self, armed_for: DateTime<Utc>) {
        let mut inner = self.inner.write();
        match inner.phase {
            GamePhase::PostGame { ended_at } if ended_at == armed_for => {
                debug!(ended_at = %ended_at, "post-game window expired");
                inner.phase = GamePhase::Idle;
            }
            _ => {
                debug!(armed_for = %armed_for, phase = ?inner.phase, "expiry timer fired against superseded state");
            }
        }
    }

    /// Backdate the store into a post-game phase, as if the process had
    /// restarted after a game ended and the armed timer was lost
    #[cfg(test)]
    pub(crate) fn force_post_game(&self, ended_at: DateTime<Utc>) {
        let mut inner = self.inner.write();
        inner.phase = GamePhase::PostGame { ended_at };
        inner.last_game_end_time = Some(ended_at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    #[tokio::test]
    async fn test_start_then_end_game() {
        let store = GameSessionStore::with_window(Duration::from_secs(7200));

        store.start_game("g1");
        let state = store.snapshot();
        assert!(state.is_active);
        assert!(!state.is_post_game);
        assert_eq!(state.game_id.as_deref(), Some("g1"));

        store.end_game();
        let state = store.snapshot();
        assert!(!state.is_active);
        assert!(state.is_post_game);
        assert!(state.last_game_end_time.is_some());
    }

    #[tokio::test]
    async fn test_never_both_active_and_post_game() {
        let store = GameSessionStore::with_window(Duration::from_secs(7200));
        for _ in 0..3 {
            store.start_game("g");
            let s = store.snapshot();
            assert!(!(s.is_active && s.is_post_game));
            store.end_game();
            let s = store.snapshot();
            assert!(!(s.is_active && s.is_post_game));
        }
    }

    #[tokio::test]
    async fn test_end_game_without_active_is_noop() {
        let store = GameSessionStore::with_window(Duration::from_secs(7200));
        store.end_game();
        assert_eq!(store.phase(), GamePhase::Idle);
    }

    #[tokio::test]
    async fn test_timer_expires_post_game() {
        let store = GameSessionStore::with_window(Duration::from_millis(20));
        store.start_game("g1");
        store.end_game();
        assert!(store.snapshot().is_post_game);

        tokio::time::sleep(Duration::from_millis(80)).await;
        let state = store.snapshot();
        assert!(!state.is_post_game);
        assert!(!state.is_active);
        // last_game_end_time survives the window
        assert!(state.last_game_end_time.is_some());
    }

    #[tokio::test]
    async fn test_expiry_never_stomps_fresh_active_game() {
        let store = GameSessionStore::with_window(Duration::from_millis(20));
        store.start_game("g1");
        store.end_game();
        // New game supersedes the pending window before the timer fires
        store.start_game("g2");

        tokio::time::sleep(Duration::from_millis(80)).await;
        let state = store.snapshot();
        assert!(state.is_active);
        assert_eq!(state.game_id.as_deref(), Some("g2"));
    }

    #[tokio::test]
    async fn test_poll_clears_overdue_window() {
        let store = GameSessionStore::with_window(Duration::from_secs(7200));
        // Simulate a restart: post-game entered 3 hours ago, timer lost
        store.force_post_game(Utc::now() - ChronoDuration::hours(3));

        let state = store.check_post_game_status();
        assert!(!state.is_post_game);
        assert!(!state.is_active);
    }

    #[tokio::test]
    async fn test_poll_keeps_open_window() {
        let store = GameSessionStore::with_window(Duration::from_secs(7200));
        store.force_post_game(Utc::now() - ChronoDuration::minutes(30));

        let state = store.check_post_game_status();
        assert!(state.is_post_game);

        // Idempotent
        let state = store.check_post_game_status();
        assert!(state.is_post_game);
    }
}
