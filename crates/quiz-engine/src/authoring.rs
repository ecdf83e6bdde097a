//! Lesson authoring and validation

use academy_core::{AcademyError, Category, Difficulty, Lesson, Question, OPTION_COUNT};
use serde::{Deserialize, Serialize};

/// A lesson as submitted by an author, before it has an id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LessonDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub video_ref: String,
    pub category: Category,
    /// Falls back to beginner
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    pub questions: Vec<Question>,
}

impl LessonDraft {
    pub fn into_lesson(self, id: u32) -> Result<Lesson, AcademyError> {
        let lesson = Lesson {
            id,
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            video_ref: self.video_ref.trim().to_string(),
            category: self.category,
            difficulty: self.difficulty.unwrap_or_default(),
            questions: self.questions,
        };
        validate_lesson(&lesson)?;
        Ok(lesson)
    }
}

fn validate_question(lesson_id: u32, index: usize, question: &Question) -> Result<(), AcademyError> {
    if question.prompt.trim().is_empty() {
        return Err(AcademyError::InvalidLesson(format!(
            "lesson {} question {} has an empty prompt",
            lesson_id, index
        )));
    }
    if let Some(blank) = question.options.iter().position(|o| o.trim().is_empty()) {
        return Err(AcademyError::InvalidLesson(format!(
            "lesson {} question {} option {} is empty",
            lesson_id, index, blank
        )));
    }
    if question.correct_index >= OPTION_COUNT {
        return Err(AcademyError::InvalidLesson(format!(
            "lesson {} question {} correct index {} is out of range",
            lesson_id, index, question.correct_index
        )));
    }
    Ok(())
}

/// Title, video and at least one well-formed question are required.
pub fn validate_lesson(lesson: &Lesson) -> Result<(), AcademyError> {
    if lesson.title.trim().is_empty() {
        return Err(AcademyError::InvalidLesson(format!("lesson {} has no title", lesson.id)));
    }
    if lesson.video_ref.trim().is_empty() {
        return Err(AcademyError::InvalidLesson(format!("lesson {} has no video", lesson.id)));
    }
    if lesson.questions.is_empty() {
        return Err(AcademyError::InvalidLesson(format!("lesson {} has no questions", lesson.id)));
    }
    for (i, question) in lesson.questions.iter().enumerate() {
        validate_question(lesson.id, i, question)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::tests::question;

    fn draft() -> LessonDraft {
        LessonDraft {
            title: "  Moving Averages ".to_string(),
            description: String::new(),
            video_ref: "https://example.com/ma".to_string(),
            category: Category::TechnicalAnalysis,
            difficulty: None,
            questions: vec![question("What does SMA stand for?", 0)],
        }
    }

    #[test]
    fn test_draft_defaults() {
        let lesson = draft().into_lesson(7).unwrap();

        assert_eq!(lesson.id, 7);
        assert_eq!(lesson.title, "Moving Averages");
        assert_eq!(lesson.difficulty, Difficulty::Beginner);
    }

    #[test]
    fn test_required_fields() {
        let mut no_title = draft();
        no_title.title = "   ".to_string();
        assert!(matches!(no_title.into_lesson(1), Err(AcademyError::InvalidLesson(_))));

        let mut no_video = draft();
        no_video.video_ref.clear();
        assert!(no_video.into_lesson(1).is_err());

        let mut no_questions = draft();
        no_questions.questions.clear();
        assert!(no_questions.into_lesson(1).is_err());
    }

    #[test]
    fn test_bad_questions() {
        let mut bad_index = draft();
        bad_index.questions[0].correct_index = 4;
        assert!(bad_index.into_lesson(1).is_err());

        let mut blank_option = draft();
        blank_option.questions[0].options[2] = " ".to_string();
        let err = blank_option.into_lesson(1).unwrap_err();
        assert_eq!(err.to_string(), "Invalid lesson: lesson 1 question 0 option 2 is empty");
    }

    #[test]
    fn test_draft_from_json() {
        let json = r#"{
            "title": "Position sizing",
            "video_ref": "https://example.com/size",
            "category": "risk-management",
            "difficulty": "advanced",
            "questions": [{
                "prompt": "Risk per trade?",
                "options": ["1%", "10%", "25%", "50%"],
                "correct_index": 0,
                "explanation": "Keep it small."
            }]
        }"#;
        let draft: LessonDraft = serde_json::from_str(json).unwrap();
        let lesson = draft.into_lesson(2).unwrap();

        assert_eq!(lesson.category, Category::RiskManagement);
        assert_eq!(lesson.difficulty, Difficulty::Advanced);
        assert!(lesson.description.is_empty());
    }
}
