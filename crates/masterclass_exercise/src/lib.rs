//! # Masterclass Exercise
//!
//! Everything around the primitives that turns them into a course: loading
//! exercises and lessons from disk, tracking completion, summarizing test
//! runs and keeping the student's draft code between sessions.
//!
//! ```no_run
//! use masterclass_exercise::{ContentLoader, FsContentLoader, Locale};
//!
//! let content = FsContentLoader::from_env_or("content/exercises", "content/modules");
//! for id in content.exercise_ids()? {
//!     if let Some(exercise) = content.exercise(&id)? {
//!         println!("{id}: {}", exercise.meta.title.get(Locale::En));
//!     }
//! }
//! # Ok::<(), masterclass_exercise::ContentError>(())
//! ```

pub mod content;
pub mod curriculum;
pub mod draft;
pub mod error;
pub mod locale;
pub mod progress;
pub mod runner;
pub mod session;

pub use content::{
    validate_slug, ContentLoader, Difficulty, Exercise, ExerciseFiles, ExerciseMeta,
    FsContentLoader, Lesson, LessonMeta,
};
pub use curriculum::{ModuleConfig, MODULES};
pub use draft::{DraftStorage, ExerciseDraft, MemoryDraftStorage};
pub use error::{ContentError, Result};
pub use locale::{Locale, Localized};
pub use progress::{
    CompletionResult, InMemoryProgressStore, ModuleProgress, ProgressEntry, ProgressStore,
};
pub use runner::{SummaryStatus, TestCase, TestReport, TestStatus, TestSummary};
pub use session::ExerciseSession;
