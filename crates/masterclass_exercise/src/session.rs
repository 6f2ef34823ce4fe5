//! One student working on one exercise

use std::sync::Arc;

use masterclass_scheduler::SchedulerHandle;
use tracing::{debug, warn};

use crate::content::Exercise;
use crate::draft::{DraftStorage, ExerciseDraft};
use crate::locale::Locale;
use crate::progress::{CompletionResult, ProgressStore};
use crate::runner::TestSummary;

pub struct ExerciseSession {
    exercise: Exercise,
    locale: Locale,
    user: Option<String>,
    progress: Arc<dyn ProgressStore>,
    draft: ExerciseDraft,
    hint_index: Option<usize>,
    show_solution: bool,
    completed: bool,
    last_summary: TestSummary,
}

impl ExerciseSession {
    pub fn new(
        exercise: Exercise,
        locale: Locale,
        user: Option<String>,
        progress: Arc<dyn ProgressStore>,
        drafts: Arc<dyn DraftStorage>,
        scheduler: SchedulerHandle,
    ) -> Self {
        let draft = ExerciseDraft::new(
            &exercise.meta.id,
            exercise.files.initial.clone(),
            drafts,
            scheduler,
        );
        Self::with_draft(exercise, locale, user, progress, draft)
    }

    pub fn with_draft(
        exercise: Exercise,
        locale: Locale,
        user: Option<String>,
        progress: Arc<dyn ProgressStore>,
        draft: ExerciseDraft,
    ) -> Self {
        let completed = progress.is_exercise_completed(user.as_deref(), &exercise.meta.id);
        Self {
            exercise,
            locale,
            user,
            progress,
            draft,
            hint_index: None,
            show_solution: false,
            completed,
            last_summary: TestSummary::default(),
        }
    }

    pub fn exercise(&self) -> &Exercise {
        &self.exercise
    }

    pub fn id(&self) -> &str {
        &self.exercise.meta.id
    }

    pub fn draft(&self) -> &ExerciseDraft {
        &self.draft
    }

    pub fn hints(&self) -> &[String] {
        self.exercise.hints(self.locale)
    }

    /// The last revealed hint
    pub fn current_hint(&self) -> Option<&str> {
        self.hint_index
            .and_then(|i| self.hints().get(i))
            .map(String::as_str)
    }

    pub fn revealed_hints(&self) -> usize {
        self.hint_index.map_or(0, |i| i + 1)
    }

    pub fn has_more_hints(&self) -> bool {
        self.revealed_hints() < self.hints().len()
    }

    /// Reveal the next hint. Stays on the last one once all are shown.
    pub fn show_next_hint(&mut self) -> Option<&str> {
        let len = self.hints().len();
        if len == 0 {
            return None;
        }
        self.hint_index = Some(self.hint_index.map_or(0, |i| (i + 1).min(len - 1)));
        self.current_hint()
    }

    pub fn is_solution_shown(&self) -> bool {
        self.show_solution
    }

    pub fn toggle_solution(&mut self) -> bool {
        self.show_solution = !self.show_solution;
        self.show_solution
    }

    /// What the editor shows: the solution while it is revealed, else the draft
    pub fn active_code(&self) -> String {
        if self.show_solution {
            self.exercise.files.solution.clone()
        } else {
            self.draft.code()
        }
    }

    pub fn update_code(&self, code: impl Into<String>) {
        self.draft.update(code);
    }

    /// Whether the "saved" badge shows. It is hidden while the solution is up.
    pub fn shows_saved_badge(&self) -> bool {
        self.draft.has_saved_code() && !self.show_solution
    }

    pub fn reset(&mut self) {
        self.draft.clear();
        self.show_solution = false;
        self.hint_index = None;
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn last_summary(&self) -> TestSummary {
        self.last_summary
    }

    /// Record one test run. A passing run persists completion; the result of
    /// that call is returned. Other runs return `None`.
    pub fn record_results(&mut self, summary: TestSummary) -> Option<CompletionResult> {
        self.last_summary = summary;
        if !summary.is_pass() {
            return None;
        }

        let result = self
            .progress
            .complete_exercise(self.user.as_deref(), &self.exercise.meta.id);
        if result.success {
            self.completed = true;
            debug!(exercise = %self.exercise.meta.id, "completion recorded");
        } else {
            warn!(
                exercise = %self.exercise.meta.id,
                error = result.error.as_deref().unwrap_or("unknown"),
                "failed to record completion"
            );
        }
        Some(result)
    }
}

impl std::fmt::Debug for ExerciseSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExerciseSession")
            .field("exercise", &self.exercise.meta.id)
            .field("locale", &self.locale)
            .field("hint_index", &self.hint_index)
            .field("show_solution", &self.show_solution)
            .field("completed", &self.completed)
            .finish()
    }
}
