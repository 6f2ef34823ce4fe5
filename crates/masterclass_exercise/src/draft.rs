//! Work-in-progress code, saved with a debounce
//!
//! Every edit restarts the save timer, so a burst of typing produces one
//! write once the student pauses.

use std::io;
use std::sync::{Arc, Mutex, Weak};

use masterclass_core::LockExt;
use masterclass_scheduler::{SchedulerHandle, TimerGuard};
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

pub const DRAFT_KEY_PREFIX: &str = "bum-exercise-";
pub const DEFAULT_SAVE_DEBOUNCE_MS: u64 = 500;

pub fn draft_key(exercise_id: &str) -> String {
    format!("{DRAFT_KEY_PREFIX}{exercise_id}")
}

/// Key/value storage for drafts
pub trait DraftStorage: Send + Sync {
    fn load(&self, key: &str) -> Option<String>;
    fn save(&self, key: &str, code: &str) -> io::Result<()>;
    fn remove(&self, key: &str) -> io::Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryDraftStorage {
    entries: Mutex<FxHashMap<String, String>>,
}

impl MemoryDraftStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.locked().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DraftStorage for MemoryDraftStorage {
    fn load(&self, key: &str) -> Option<String> {
        self.entries.locked().get(key).cloned()
    }

    fn save(&self, key: &str, code: &str) -> io::Result<()> {
        self.entries.locked().insert(key.to_string(), code.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> io::Result<()> {
        self.entries.locked().remove(key);
        Ok(())
    }
}

struct DraftState {
    code: String,
    has_saved: bool,
    pending: Option<TimerGuard>,
}

struct DraftShared {
    key: String,
    initial: String,
    storage: Arc<dyn DraftStorage>,
    scheduler: SchedulerHandle,
    debounce_ms: u64,
    state: Mutex<DraftState>,
}

impl DraftShared {
    fn save_now(&self) {
        let code = {
            let mut state = self.state.locked();
            state.pending = None;
            state.code.clone()
        };
        match self.storage.save(&self.key, &code) {
            Ok(()) => {
                self.state.locked().has_saved = true;
                debug!(key = %self.key, bytes = code.len(), "draft saved");
            }
            Err(error) => warn!(key = %self.key, %error, "failed to save draft"),
        }
    }
}

/// The student's code for one exercise
///
/// A non-empty saved draft replaces the initial code on construction.
/// Dropping the draft cancels a pending save.
pub struct ExerciseDraft {
    shared: Arc<DraftShared>,
}

impl ExerciseDraft {
    pub fn new(
        exercise_id: &str,
        initial_code: impl Into<String>,
        storage: Arc<dyn DraftStorage>,
        scheduler: SchedulerHandle,
    ) -> Self {
        Self::with_debounce(
            exercise_id,
            initial_code,
            storage,
            scheduler,
            DEFAULT_SAVE_DEBOUNCE_MS,
        )
    }

    pub fn with_debounce(
        exercise_id: &str,
        initial_code: impl Into<String>,
        storage: Arc<dyn DraftStorage>,
        scheduler: SchedulerHandle,
        debounce_ms: u64,
    ) -> Self {
        let key = draft_key(exercise_id);
        let initial = initial_code.into();
        let saved = storage.load(&key).filter(|code| !code.is_empty());
        let has_saved = saved.is_some();
        let code = saved.unwrap_or_else(|| initial.clone());

        Self {
            shared: Arc::new(DraftShared {
                key,
                initial,
                storage,
                scheduler,
                debounce_ms,
                state: Mutex::new(DraftState {
                    code,
                    has_saved,
                    pending: None,
                }),
            }),
        }
    }

    pub fn key(&self) -> &str {
        &self.shared.key
    }

    pub fn code(&self) -> String {
        self.shared.state.locked().code.clone()
    }

    pub fn initial_code(&self) -> &str {
        &self.shared.initial
    }

    pub fn has_saved_code(&self) -> bool {
        self.shared.state.locked().has_saved
    }

    pub fn is_save_pending(&self) -> bool {
        self.shared
            .state
            .locked()
            .pending
            .as_ref()
            .is_some_and(TimerGuard::is_pending)
    }

    /// Replace the code and restart the save timer
    pub fn update(&self, code: impl Into<String>) {
        let weak: Weak<DraftShared> = Arc::downgrade(&self.shared);
        let guard = self
            .shared
            .scheduler
            .timeout(self.shared.debounce_ms, "draft-save", move || {
                if let Some(shared) = weak.upgrade() {
                    shared.save_now();
                }
            });

        let previous = {
            let mut state = self.shared.state.locked();
            state.code = code.into();
            state.pending.replace(guard)
        };
        drop(previous);
    }

    /// Save immediately if a save is pending
    pub fn flush(&self) {
        let pending = self.shared.state.locked().pending.take();
        if let Some(guard) = pending {
            if guard.cancel() {
                self.shared.save_now();
            }
        }
    }

    /// Forget the saved draft and go back to the initial code
    pub fn clear(&self) {
        let pending = {
            let mut state = self.shared.state.locked();
            state.code = self.shared.initial.clone();
            state.has_saved = false;
            state.pending.take()
        };
        drop(pending);

        if let Err(error) = self.shared.storage.remove(&self.shared.key) {
            warn!(key = %self.shared.key, %error, "failed to remove draft");
        }
    }
}

impl std::fmt::Debug for ExerciseDraft {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.state.locked();
        f.debug_struct("ExerciseDraft")
            .field("key", &self.shared.key)
            .field("has_saved", &state.has_saved)
            .field("pending", &state.pending.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use masterclass_scheduler::TimerScheduler;

    struct FailingStorage;

    impl DraftStorage for FailingStorage {
        fn load(&self, _key: &str) -> Option<String> {
            None
        }

        fn save(&self, _key: &str, _code: &str) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::Other, "quota exceeded"))
        }

        fn remove(&self, _key: &str) -> io::Result<()> {
            Ok(())
        }
    }

    fn setup() -> (TimerScheduler, Arc<MemoryDraftStorage>, ExerciseDraft) {
        let scheduler = TimerScheduler::manual();
        let storage = Arc::new(MemoryDraftStorage::new());
        let draft = ExerciseDraft::new("button-basic", "// start", storage.clone(), scheduler.handle());
        (scheduler, storage, draft)
    }

    #[test]
    fn test_key_prefix() {
        assert_eq!(draft_key("button-basic"), "bum-exercise-button-basic");
    }

    #[test]
    fn test_starts_from_initial_code() {
        let (_scheduler, _storage, draft) = setup();
        assert_eq!(draft.code(), "// start");
        assert!(!draft.has_saved_code());
    }

    #[test]
    fn test_save_is_debounced() {
        let (scheduler, storage, draft) = setup();

        draft.update("a");
        scheduler.advance(300);
        draft.update("ab");
        scheduler.advance(499);
        assert_eq!(storage.load(draft.key()), None);
        assert!(draft.is_save_pending());

        scheduler.advance(1);
        assert_eq!(storage.load(draft.key()).as_deref(), Some("ab"));
        assert!(draft.has_saved_code());
        assert!(!draft.is_save_pending());
    }

    #[test]
    fn test_saved_draft_restored() {
        let scheduler = TimerScheduler::manual();
        let storage = Arc::new(MemoryDraftStorage::new());
        storage.save(&draft_key("switch-basic"), "// mine").unwrap();

        let draft = ExerciseDraft::new("switch-basic", "// start", storage, scheduler.handle());
        assert_eq!(draft.code(), "// mine");
        assert!(draft.has_saved_code());
    }

    #[test]
    fn test_empty_saved_draft_ignored() {
        let scheduler = TimerScheduler::manual();
        let storage = Arc::new(MemoryDraftStorage::new());
        storage.save(&draft_key("switch-basic"), "").unwrap();

        let draft = ExerciseDraft::new("switch-basic", "// start", storage, scheduler.handle());
        assert_eq!(draft.code(), "// start");
        assert!(!draft.has_saved_code());
    }

    #[test]
    fn test_clear_restores_initial() {
        let (scheduler, storage, draft) = setup();
        draft.update("edited");
        scheduler.advance(500);
        draft.update("edited again");

        draft.clear();
        assert_eq!(draft.code(), "// start");
        assert!(!draft.has_saved_code());
        assert!(storage.is_empty());

        // the pending save was cancelled
        scheduler.advance(1000);
        assert!(storage.is_empty());
    }

    #[test]
    fn test_flush_saves_now() {
        let (scheduler, storage, draft) = setup();
        draft.update("typed");
        draft.flush();
        assert_eq!(storage.load(draft.key()).as_deref(), Some("typed"));
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[test]
    fn test_drop_cancels_pending_save() {
        let (scheduler, storage, draft) = setup();
        draft.update("unsaved");
        drop(draft);
        scheduler.advance(1000);
        assert!(storage.is_empty());
    }

    #[test]
    fn test_failed_save_keeps_unsaved_state() {
        let scheduler = TimerScheduler::manual();
        let draft = ExerciseDraft::new("x", "", Arc::new(FailingStorage), scheduler.handle());
        draft.update("code");
        scheduler.advance(500);
        assert!(!draft.has_saved_code());
        assert_eq!(draft.code(), "code");
    }
}
