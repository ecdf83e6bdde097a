//! Lesson Session
//!
//! One open lesson for one learner. The session owns the answers given so
//! far. A successful submit consumes it; `close` abandons it.

use academy_core::{AcademyError, AnswerSet, Lesson, ScoreResult, UserContext, OPTION_COUNT};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::catalog::LessonCatalog;
use crate::scoring;

#[derive(Debug)]
pub struct LessonSession<'a> {
    id: Uuid,
    user: UserContext,
    lesson: &'a Lesson,
    answers: AnswerSet,
    started_at: DateTime<Utc>,
}

impl<'a> LessonSession<'a> {
    /// Open a lesson the user is allowed to see
    pub fn start(catalog: &'a LessonCatalog, user: &UserContext, lesson_id: u32) -> Result<Self, AcademyError> {
        let lesson = catalog.lesson_for(user, lesson_id)?;
        let session = Self {
            id: Uuid::new_v4(),
            user: user.clone(),
            lesson,
            answers: AnswerSet::new(),
            started_at: Utc::now(),
        };
        tracing::debug!("Session {} opened lesson {} for '{}'", session.id, lesson.id, user.name);
        Ok(session)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user(&self) -> &UserContext {
        &self.user
    }

    pub fn lesson(&self) -> &'a Lesson {
        self.lesson
    }

    pub fn answers(&self) -> &AnswerSet {
        &self.answers
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Choose an option; choosing again replaces the earlier pick.
    pub fn select(&mut self, question: usize, option: usize) -> Result<(), AcademyError> {
        let total = self.lesson.questions.len();
        if question >= total {
            return Err(AcademyError::InvalidAnswer(format!(
                "question {} out of range (lesson has {})",
                question, total
            )));
        }
        if option >= OPTION_COUNT {
            return Err(AcademyError::InvalidAnswer(format!(
                "option {} out of range (questions have {})",
                option, OPTION_COUNT
            )));
        }
        self.answers.select(question, option);
        Ok(())
    }

    /// Questions still without an answer
    pub fn missing(&self) -> Vec<usize> {
        self.answers.missing(self.lesson.questions.len())
    }

    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }

    pub fn progress_pct(&self) -> f64 {
        let total = self.lesson.questions.len();
        if total == 0 {
            return 100.0;
        }
        (total - self.missing().len()) as f64 / total as f64 * 100.0
    }

    /// Score the answers and end the session. While the quiz is incomplete
    /// the session is handed back, still open, with the unanswered indices.
    #[allow(clippy::result_large_err)]
    pub fn submit(self) -> Result<ScoreResult, (Self, AcademyError)> {
        match scoring::score(self.lesson, &self.answers) {
            Ok(result) => {
                tracing::debug!("Session {} scored {}", self.id, scoring::summary(&result));
                Ok(result)
            }
            Err(e) => {
                tracing::debug!("Session {} submission refused: {}", self.id, e);
                Err((self, e))
            }
        }
    }

    /// End the session, discarding its answers.
    pub fn close(self) {
        tracing::debug!("Session {} closed", self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use academy_core::Role;

    fn catalog() -> LessonCatalog {
        LessonCatalog::builtin().unwrap()
    }

    #[test]
    fn test_session_flow() {
        let catalog = catalog();
        let anna = catalog.resolve_user("anna").unwrap();
        let mut session = LessonSession::start(&catalog, &anna, 1).unwrap();

        assert_eq!(session.lesson().questions.len(), 2);
        assert!(!session.is_complete());

        session.select(0, 1).unwrap();
        assert_eq!(session.progress_pct(), 50.0);
        let (mut session, err) = session.submit().unwrap_err();
        assert_eq!(err, AcademyError::IncompleteSubmission { missing: vec![1] });
        assert_eq!(session.answers().len(), 1);

        session.select(1, 0).unwrap();
        session.select(1, 2).unwrap();
        let result = session.submit().unwrap();
        assert_eq!(result.correct_count, 2);
        assert_eq!(result.percentage(), 100);
    }

    #[test]
    fn test_refused_submit_returns_same_session() {
        let catalog = catalog();
        let bat = catalog.resolve_user("bat").unwrap();
        let session = LessonSession::start(&catalog, &bat, 1).unwrap();
        let id = session.id();

        let (session, err) = session.submit().unwrap_err();
        assert_eq!(err, AcademyError::IncompleteSubmission { missing: vec![0, 1] });
        assert_eq!(session.id(), id);
        assert!(!session.is_complete());
    }

    #[test]
    fn test_select_rejects_out_of_range() {
        let catalog = catalog();
        let admin = UserContext::new("admin", Role::Admin);
        let mut session = LessonSession::start(&catalog, &admin, 2).unwrap();

        assert!(matches!(session.select(1, 0), Err(AcademyError::InvalidAnswer(_))));
        assert!(matches!(session.select(0, 4), Err(AcademyError::InvalidAnswer(_))));
        assert!(session.answers().is_empty());
    }

    #[test]
    fn test_cannot_open_unassigned_lesson() {
        let catalog = catalog();
        let anna = catalog.resolve_user("anna").unwrap();

        assert!(matches!(
            LessonSession::start(&catalog, &anna, 5),
            Err(AcademyError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_sessions_are_independent() {
        let catalog = catalog();
        let bat = catalog.resolve_user("bat").unwrap();
        let mut first = LessonSession::start(&catalog, &bat, 2).unwrap();
        first.select(0, 1).unwrap();
        first.close();

        let second = LessonSession::start(&catalog, &bat, 2).unwrap();
        assert!(second.answers().is_empty());
    }
}
