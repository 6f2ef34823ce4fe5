//! Exercise completion records
//!
//! Callers pass the signed-in user, or `None` when there is no session.
//! Anonymous writes fail with `"Unauthorized"`; anonymous reads see nothing.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use masterclass_core::LockExt;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const UNAUTHORIZED: &str = "Unauthorized";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEntry {
    pub exercise_id: String,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CompletionResult {
    pub fn completed(at: DateTime<Utc>) -> Self {
        Self {
            success: true,
            completed_at: Some(at),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            completed_at: None,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleProgress {
    pub module_slug: String,
    pub completed: usize,
    pub total: usize,
    /// Rounded to the nearest whole percent, 0 for an empty module
    pub percentage: u32,
}

impl ModuleProgress {
    pub fn new(module_slug: impl Into<String>, completed: usize, total: usize) -> Self {
        let percentage = if total == 0 {
            0
        } else {
            (completed as f64 / total as f64 * 100.0).round() as u32
        };
        Self {
            module_slug: module_slug.into(),
            completed,
            total,
            percentage,
        }
    }
}

/// Persistence for completed exercises
pub trait ProgressStore: Send + Sync {
    /// Mark an exercise completed. Completing it again keeps the first
    /// timestamp.
    fn complete_exercise(&self, user: Option<&str>, exercise_id: &str) -> CompletionResult;

    /// Completed exercises, oldest first
    fn user_progress(&self, user: Option<&str>) -> Vec<ProgressEntry>;

    fn is_exercise_completed(&self, user: Option<&str>, exercise_id: &str) -> bool {
        self.user_progress(user)
            .iter()
            .any(|entry| entry.exercise_id == exercise_id)
    }

    /// Completion of one module, given the ids of the exercises it contains
    fn module_progress(
        &self,
        user: Option<&str>,
        module_slug: &str,
        exercise_ids: &[String],
    ) -> ModuleProgress {
        let done = self.user_progress(user);
        let completed = exercise_ids
            .iter()
            .filter(|id| done.iter().any(|entry| &entry.exercise_id == *id))
            .count();
        ModuleProgress::new(module_slug, completed, exercise_ids.len())
    }
}

type Now = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Progress kept in memory, per user
pub struct InMemoryProgressStore {
    records: Mutex<FxHashMap<String, Vec<ProgressEntry>>>,
    now: Now,
}

impl InMemoryProgressStore {
    pub fn new() -> Self {
        Self::with_clock(Utc::now)
    }

    /// Use `now` for completion timestamps
    pub fn with_clock(now: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        Self {
            records: Mutex::new(FxHashMap::default()),
            now: Arc::new(now),
        }
    }
}

impl Default for InMemoryProgressStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryProgressStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryProgressStore")
            .field("users", &self.records.locked().len())
            .finish()
    }
}

impl ProgressStore for InMemoryProgressStore {
    fn complete_exercise(&self, user: Option<&str>, exercise_id: &str) -> CompletionResult {
        let Some(user) = user else {
            return CompletionResult::failed(UNAUTHORIZED);
        };

        let mut records = self.records.locked();
        let entries = records.entry(user.to_string()).or_default();
        if let Some(existing) = entries.iter().find(|e| e.exercise_id == exercise_id) {
            return CompletionResult::completed(existing.completed_at);
        }

        let completed_at = (self.now)();
        entries.push(ProgressEntry {
            exercise_id: exercise_id.to_string(),
            completed_at,
        });
        debug!(user, exercise_id, "exercise completed");
        CompletionResult::completed(completed_at)
    }

    fn user_progress(&self, user: Option<&str>) -> Vec<ProgressEntry> {
        let Some(user) = user else {
            return Vec::new();
        };
        let mut entries = self.records.locked().get(user).cloned().unwrap_or_default();
        entries.sort_by_key(|e| e.completed_at);
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use std::sync::atomic::{AtomicI64, Ordering};

    /// Each call is one minute after the previous one
    fn stepping_store() -> InMemoryProgressStore {
        let minutes = AtomicI64::new(0);
        let start = Utc.with_ymd_and_hms(2026, 2, 18, 9, 0, 0).unwrap();
        InMemoryProgressStore::with_clock(move || {
            start + Duration::minutes(minutes.fetch_add(1, Ordering::SeqCst))
        })
    }

    #[test]
    fn test_complete_requires_user() {
        let store = stepping_store();
        let result = store.complete_exercise(None, "button-basic");
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some(UNAUTHORIZED));
        assert!(store.user_progress(None).is_empty());
        assert!(!store.is_exercise_completed(None, "button-basic"));
    }

    #[test]
    fn test_complete_is_idempotent() {
        let store = stepping_store();
        let first = store.complete_exercise(Some("u1"), "button-basic");
        let second = store.complete_exercise(Some("u1"), "button-basic");

        assert!(first.success && second.success);
        assert_eq!(first.completed_at, second.completed_at);
        assert_eq!(store.user_progress(Some("u1")).len(), 1);
    }

    #[test]
    fn test_progress_is_per_user_and_ordered() {
        let store = stepping_store();
        store.complete_exercise(Some("u1"), "switch-basic");
        store.complete_exercise(Some("u2"), "button-basic");
        store.complete_exercise(Some("u1"), "input-basic");

        let ids: Vec<String> = store
            .user_progress(Some("u1"))
            .into_iter()
            .map(|e| e.exercise_id)
            .collect();
        assert_eq!(ids, ["switch-basic", "input-basic"]);
        assert!(store.is_exercise_completed(Some("u2"), "button-basic"));
        assert!(!store.is_exercise_completed(Some("u2"), "switch-basic"));
    }

    #[test]
    fn test_module_progress() {
        let store = stepping_store();
        store.complete_exercise(Some("u1"), "button-basic");
        store.complete_exercise(Some("u1"), "switch-basic");

        let ids = vec![
            "button-basic".to_string(),
            "input-basic".to_string(),
            "separator-basic".to_string(),
        ];
        let progress = store.module_progress(Some("u1"), "01-primitives", &ids);
        assert_eq!(progress.completed, 1);
        assert_eq!(progress.total, 3);
        assert_eq!(progress.percentage, 33);

        let empty = store.module_progress(Some("u1"), "12-capstone", &[]);
        assert_eq!(empty.percentage, 0);
    }

    #[test]
    fn test_completion_serializes_camel_case() {
        let at = Utc.with_ymd_and_hms(2026, 2, 18, 9, 0, 0).unwrap();
        let json = serde_json::to_value(CompletionResult::completed(at)).unwrap();
        assert_eq!(json["success"], true);
        assert!(json.get("completedAt").is_some());
        assert!(json.get("error").is_none());
    }
}
