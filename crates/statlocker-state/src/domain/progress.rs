//! Progress Store
//!
//! Owns the [`UserProgress`] aggregate: the onboarding flag, the per-task
//! completion records for the 4-task demo catalog, and view counters.
//! Mirrored write-through to storage under `user_progress` (suffixed with
//! the user id when one is present).

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::infra::kv::{scoped_key, KeyValueStore};
use crate::KEY_USER_PROGRESS;

/// Progress on a single demo task from the fixed catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskProgress {
    /// Unique task id from the static catalog
    pub id: String,
    /// Display title
    pub title: String,
    /// Longer description shown on the task card
    pub description: String,
    /// Call-to-action label
    pub action: String,
    /// Whether the task has been completed
    pub completed: bool,
    /// When the task was (last) completed
    pub completed_at: Option<DateTime<Utc>>,
    /// How many times the task has been viewed
    pub view_count: u32,
    /// When the task was last viewed
    pub last_viewed_at: Option<DateTime<Utc>>,
}

impl TaskProgress {
    fn catalog_entry(id: &str, title: &str, description: &str, action: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            action: action.to_string(),
            completed: false,
            completed_at: None,
            view_count: 0,
            last_viewed_at: None,
        }
    }
}

/// The user progress aggregate
///
/// Task ids are fixed and unique (static 4-task catalog);
/// `demo_tasks_completed` is always a subset of the completed task ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProgress {
    /// Owning user, `None` before sign-in
    pub user_id: Option<String>,
    /// One-way onboarding completion flag
    pub onboarding_completed: bool,
    /// When onboarding was (last) marked complete
    pub onboarding_completed_at: Option<DateTime<Utc>>,
    /// Ids of completed demo tasks, in completion order, no duplicates
    pub demo_tasks_completed: Vec<String>,
    /// Global view counter across all tasks
    pub total_demo_views: u32,
    /// Last time any progress event was recorded
    pub last_active_at: DateTime<Utc>,
    /// The task catalog with per-task progress
    pub tasks: Vec<TaskProgress>,
}

impl UserProgress {
    /// Default aggregate: the 4-task demo catalog, nothing completed
    pub fn new(user_id: Option<&str>) -> Self {
        Self {
            user_id: user_id.map(str::to_string),
            onboarding_completed: false,
            onboarding_completed_at: None,
            demo_tasks_completed: Vec::new(),
            total_demo_views: 0,
            last_active_at: Utc::now(),
            tasks: default_task_catalog(),
        }
    }

    /// Number of completed tasks
    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.completed).count()
    }
}

/// The static demo task catalog. Ids are part of the storage contract and
/// must not change.
fn default_task_catalog() -> Vec<TaskProgress> {
    vec![
        TaskProgress::catalog_entry(
            "DEMO_GAME_TRACKING",
            "Track Your First Game",
            "Log live stats with the action wheel during a game",
            "Start tracking",
        ),
        TaskProgress::catalog_entry(
            "DEMO_COLLEGE_PIPELINE",
            "Explore the College Pipeline",
            "See how your stats stack up for recruiters",
            "Open pipeline",
        ),
        TaskProgress::catalog_entry(
            "DEMO_PROFILE_FEATURES",
            "Tour Your Profile",
            "Set up your athlete profile and season highlights",
            "View profile",
        ),
        TaskProgress::catalog_entry(
            "DEMO_SKILLS_DRILLS",
            "Try Skills & Drills",
            "Browse drills matched to your position",
            "Browse drills",
        ),
    ]
}

/// Store owning the [`UserProgress`] aggregate
///
/// In-memory state is the source of truth for the running session;
/// persistence is best-effort write-through. No mutation ever fails from
/// the caller's perspective.
pub struct ProgressStore {
    storage: Arc<dyn KeyValueStore>,
    key: RwLock<String>,
    state: RwLock<UserProgress>,
}

impl ProgressStore {
    /// Create a store over a storage backend, unscoped until
    /// [`initialize`](Self::initialize) resolves the user
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            storage,
            key: RwLock::new(KEY_USER_PROGRESS.to_string()),
            state: RwLock::new(UserProgress::new(None)),
        }
    }

    /// Load the persisted aggregate for the resolved key, seeding the
    /// default catalog (and persisting it immediately) on absence.
    ///
    /// Fails soft: any load or parse error falls back to the in-memory
    /// default aggregate and logs the error.
    pub async fn initialize(&self, user_id: Option<&str>) {
        let key = scoped_key(KEY_USER_PROGRESS, user_id);
        *self.key.write() = key.clone();

        match self.storage.get(&key).await {
            Ok(Some(blob)) => match serde_json::from_str::<UserProgress>(&blob) {
                Ok(loaded) => {
                    info!(key = %key, "loaded user progress");
                    *self.state.write() = loaded;
                }
                Err(e) => {
                    warn!(key = %key, error = %e, "stored user progress unparseable, using defaults");
                    *self.state.write() = UserProgress::new(user_id);
                }
            },
            Ok(None) => {
                debug!(key = %key, "no stored user progress, seeding default catalog");
                *self.state.write() = UserProgress::new(user_id);
                self.persist().await;
            }
            Err(e) => {
                warn!(key = %key, error = %e, "failed to load user progress, using defaults");
                *self.state.write() = UserProgress::new(user_id);
            }
        }
    }

    /// Mark a task completed. Idempotent: an already-completed task gets its
    /// `completed_at` re-stamped and `demo_tasks_completed` is unchanged.
    /// Unknown ids are ignored.
    pub async fn mark_task_completed(&self, task_id: &str) {
        let mutated = {
            let mut state = self.state.write();
            let now = Utc::now();
            match state.tasks.iter().position(|t| t.id == task_id) {
                Some(idx) => {
                    let task = &mut state.tasks[idx];
                    task.completed = true;
                    task.completed_at = Some(now);
                    if !state.demo_tasks_completed.iter().any(|id| id == task_id) {
                        state.demo_tasks_completed.push(task_id.to_string());
                    }
                    state.last_active_at = now;
                    true
                }
                None => {
                    warn!(task_id, "mark_task_completed: unknown task id");
                    false
                }
            }
        };
        if mutated {
            self.persist().await;
        }
    }

    /// Increment the task's view counter and the global counter. Every call
    /// counts; there is no debouncing.
    pub async fn increment_task_view(&self, task_id: &str) {
        let mutated = {
            let mut state = self.state.write();
            let now = Utc::now();
            match state.tasks.iter().position(|t| t.id == task_id) {
                Some(idx) => {
                    let task = &mut state.tasks[idx];
                    task.view_count += 1;
                    task.last_viewed_at = Some(now);
                    state.total_demo_views += 1;
                    state.last_active_at = now;
                    true
                }
                None => {
                    warn!(task_id, "increment_task_view: unknown task id");
                    false
                }
            }
        };
        if mutated {
            self.persist().await;
        }
    }

    /// One-way onboarding flag; calling again re-stamps the timestamp.
    pub async fn mark_onboarding_completed(&self) {
        {
            let mut state = self.state.write();
            let now = Utc::now();
            state.onboarding_completed = true;
            state.onboarding_completed_at = Some(now);
            state.last_active_at = now;
        }
        self.persist().await;
    }

    /// Restore the default catalog for the current user and delete the
    /// persisted entry (not just overwrite it).
    pub async fn reset(&self) {
        let key = {
            let mut state = self.state.write();
            let user_id = state.user_id.clone();
            *state = UserProgress::new(user_id.as_deref());
            self.key.read().clone()
        };
        if let Err(e) = self.storage.remove(&key).await {
            warn!(key = %key, error = %e, "failed to delete persisted user progress");
        }
    }

    /// Progress record for a single task, if the id is known
    pub fn task_progress(&self, task_id: &str) -> Option<TaskProgress> {
        self.state
            .read()
            .tasks
            .iter()
            .find(|t| t.id == task_id)
            .cloned()
    }

    /// Completion percentage over the catalog: `round(100 * completed / total)`,
    /// rounding half away from zero
    pub fn completion_percentage(&self) -> u32 {
        let state = self.state.read();
        if state.tasks.is_empty() {
            return 0;
        }
        let pct = 100.0 * state.completed_count() as f64 / state.tasks.len() as f64;
        pct.round() as u32
    }

    /// Snapshot of the full aggregate
    pub fn snapshot(&self) -> UserProgress {
        self.state.read().clone()
    }

    /// Serialize and write the aggregate. Failures are logged, not surfaced:
    /// the in-memory state still reflects the mutation.
    async fn persist(&self) {
        let (key, payload) = {
            let state = self.state.read();
            (self.key.read().clone(), serde_json::to_string(&*state))
        };
        match payload {
            Ok(json) => {
                if let Err(e) = self.storage.set(&key, &json).await {
                    warn!(key = %key, error = %e, "failed to persist user progress");
                }
            }
            Err(e) => {
                warn!(key = %key, error = %e, "failed to serialize user progress");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::kv::MemoryKvStore;

    fn store() -> (Arc<MemoryKvStore>, ProgressStore) {
        let kv = Arc::new(MemoryKvStore::new());
        let progress = ProgressStore::new(kv.clone());
        (kv, progress)
    }

    #[tokio::test]
    async fn test_initialize_seeds_and_persists_catalog() {
        let (kv, progress) = store();
        progress.initialize(Some("athlete-1")).await;

        let snap = progress.snapshot();
        assert_eq!(snap.tasks.len(), 4);
        assert_eq!(snap.completed_count(), 0);

        // Seeded default is persisted immediately under the scoped key
        let blob = kv.get("user_progress_athlete-1").await.unwrap();
        assert!(blob.is_some());
    }

    #[tokio::test]
    async fn test_mark_task_completed_is_idempotent() {
        let (_kv, progress) = store();
        progress.initialize(None).await;

        progress.mark_task_completed("DEMO_GAME_TRACKING").await;
        progress.mark_task_completed("DEMO_GAME_TRACKING").await;

        let snap = progress.snapshot();
        let occurrences = snap
            .demo_tasks_completed
            .iter()
            .filter(|id| id.as_str() == "DEMO_GAME_TRACKING")
            .count();
        assert_eq!(occurrences, 1);
        assert!(progress.task_progress("DEMO_GAME_TRACKING").unwrap().completed);
    }

    #[tokio::test]
    async fn test_unknown_task_id_is_ignored() {
        let (_kv, progress) = store();
        progress.initialize(None).await;

        progress.mark_task_completed("DEMO_NOT_A_TASK").await;
        progress.increment_task_view("DEMO_NOT_A_TASK").await;

        let snap = progress.snapshot();
        assert_eq!(snap.completed_count(), 0);
        assert_eq!(snap.total_demo_views, 0);
    }

    #[tokio::test]
    async fn test_completion_percentage() {
        let (_kv, progress) = store();
        progress.initialize(None).await;
        assert_eq!(progress.completion_percentage(), 0);

        progress.mark_task_completed("DEMO_GAME_TRACKING").await;
        assert_eq!(progress.completion_percentage(), 25);

        progress.mark_task_completed("DEMO_COLLEGE_PIPELINE").await;
        progress.mark_task_completed("DEMO_PROFILE_FEATURES").await;
        progress.mark_task_completed("DEMO_SKILLS_DRILLS").await;
        assert_eq!(progress.completion_percentage(), 100);
    }

    #[tokio::test]
    async fn test_view_counters_are_unconditional() {
        let (_kv, progress) = store();
        progress.initialize(None).await;

        for _ in 0..3 {
            progress.increment_task_view("DEMO_SKILLS_DRILLS").await;
        }

        let task = progress.task_progress("DEMO_SKILLS_DRILLS").unwrap();
        assert_eq!(task.view_count, 3);
        assert!(task.last_viewed_at.is_some());
        assert_eq!(progress.snapshot().total_demo_views, 3);
    }

    #[tokio::test]
    async fn test_onboarding_flag_restamps() {
        let (_kv, progress) = store();
        progress.initialize(None).await;

        progress.mark_onboarding_completed().await;
        let first = progress.snapshot().onboarding_completed_at.unwrap();

        progress.mark_onboarding_completed().await;
        let second = progress.snapshot().onboarding_completed_at.unwrap();

        assert!(progress.snapshot().onboarding_completed);
        assert!(second >= first);
    }

    #[tokio::test]
    async fn test_reset_deletes_persisted_entry() {
        let (kv, progress) = store();
        progress.initialize(Some("athlete-1")).await;
        progress.mark_task_completed("DEMO_GAME_TRACKING").await;

        progress.reset().await;

        assert_eq!(progress.snapshot().completed_count(), 0);
        assert_eq!(kv.get("user_progress_athlete-1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_round_trip_preserves_timestamps() {
        let kv = Arc::new(MemoryKvStore::new());

        let first = ProgressStore::new(kv.clone());
        first.initialize(Some("athlete-1")).await;
        first.mark_task_completed("DEMO_GAME_TRACKING").await;
        first.mark_onboarding_completed().await;
        let before = first.snapshot();

        let second = ProgressStore::new(kv);
        second.initialize(Some("athlete-1")).await;
        let after = second.snapshot();

        assert_eq!(after.onboarding_completed, before.onboarding_completed);
        assert_eq!(after.onboarding_completed_at, before.onboarding_completed_at);
        assert_eq!(after.demo_tasks_completed, before.demo_tasks_completed);
        let t_before = before.tasks.iter().find(|t| t.id == "DEMO_GAME_TRACKING").unwrap();
        let t_after = after.tasks.iter().find(|t| t.id == "DEMO_GAME_TRACKING").unwrap();
        assert_eq!(t_after.completed_at, t_before.completed_at);
    }

    #[tokio::test]
    async fn test_corrupt_blob_falls_back_to_defaults() {
        let kv = Arc::new(MemoryKvStore::new());
        kv.set("user_progress", "not json at all").await.unwrap();

        let progress = ProgressStore::new(kv);
        progress.initialize(None).await;

        let snap = progress.snapshot();
        assert_eq!(snap.tasks.len(), 4);
        assert_eq!(snap.completed_count(), 0);
    }
}
