//! Quiz Engine
//!
//! Lesson catalog, quiz sessions and scoring, lesson authoring and learner
//! progress tracking for the trading academy.

pub mod authoring;
pub mod catalog;
pub mod progress;
pub mod report;
pub mod scoring;
pub mod session;

pub use authoring::{validate_lesson, LessonDraft};
pub use catalog::{LessonCatalog, LessonFilter, UserEntry};
pub use progress::{progress_key, JsonFileStore, MemoryStore, ProgressRecord, ProgressTracker};
pub use report::{build_report, summarize_user, LessonProgress, ProgressReport, UserProgressSummary};
pub use scoring::{score, summary};
pub use session::LessonSession;
