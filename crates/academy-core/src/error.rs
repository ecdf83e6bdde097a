use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AcademyError {
    /// Scoring was requested before every question had an answer.
    #[error("Incomplete submission: unanswered questions {missing:?}")]
    IncompleteSubmission { missing: Vec<usize> },

    #[error("Invalid answer: {0}")]
    InvalidAnswer(String),

    #[error("Lesson not found: {0}")]
    LessonNotFound(u32),

    #[error("Unknown user: {0}")]
    UnknownUser(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Invalid lesson: {0}")]
    InvalidLesson(String),

    #[error("Invalid chart: {0}")]
    InvalidChart(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for AcademyError {
    fn from(err: serde_json::Error) -> Self {
        AcademyError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for AcademyError {
    fn from(err: std::io::Error) -> Self {
        AcademyError::Storage(err.to_string())
    }
}
