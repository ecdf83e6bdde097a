//! Admin progress report across all configured users

use academy_core::{AcademyError, Role, UserContext};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::LessonCatalog;
use crate::progress::{ProgressRecord, ProgressTracker};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LessonProgress {
    pub lesson_id: u32,
    pub title: String,
    pub record: ProgressRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProgressSummary {
    pub user: String,
    pub role: Role,
    pub lessons_assigned: usize,
    pub lessons_completed: usize,
    pub total_attempts: u32,
    /// Mean of the latest percentage over completed lessons
    pub average_percentage: Option<f64>,
    pub lessons: Vec<LessonProgress>,
}

impl UserProgressSummary {
    pub fn completion_pct(&self) -> f64 {
        if self.lessons_assigned == 0 {
            return 0.0;
        }
        self.lessons_completed as f64 / self.lessons_assigned as f64 * 100.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressReport {
    pub generated_at: DateTime<Utc>,
    pub users: Vec<UserProgressSummary>,
}

/// Progress of one user over the lessons visible to them
pub fn summarize_user(
    catalog: &LessonCatalog,
    tracker: &ProgressTracker,
    user: &UserContext,
) -> Result<UserProgressSummary, AcademyError> {
    let visible = catalog.visible_lessons(user);
    let mut lessons = Vec::new();

    for lesson in &visible {
        if let Some(record) = tracker.get(&user.name, lesson.id)? {
            lessons.push(LessonProgress {
                lesson_id: lesson.id,
                title: lesson.title.clone(),
                record,
            });
        }
    }

    let average_percentage = if lessons.is_empty() {
        None
    } else {
        let sum: u32 = lessons.iter().map(|l| l.record.percentage).sum();
        Some(sum as f64 / lessons.len() as f64)
    };

    Ok(UserProgressSummary {
        user: user.name.clone(),
        role: user.role,
        lessons_assigned: visible.len(),
        lessons_completed: lessons.len(),
        total_attempts: lessons.iter().map(|l| l.record.attempt_count).sum(),
        average_percentage,
        lessons,
    })
}

/// Report over every configured user. Admin only.
pub fn build_report(
    requester: &UserContext,
    catalog: &LessonCatalog,
    tracker: &ProgressTracker,
    now: DateTime<Utc>,
) -> Result<ProgressReport, AcademyError> {
    if !requester.is_admin() {
        tracing::warn!("'{}' requested the progress report without admin role", requester.name);
        return Err(AcademyError::Unauthorized(format!(
            "'{}' may not view other users' progress",
            requester.name
        )));
    }

    let users = catalog
        .users()
        .map(|user| summarize_user(catalog, tracker, &user))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ProgressReport { generated_at: now, users })
}
