use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::AcademyError;

/// OHLC bar data
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// Label for the chart x-axis; indicators ignore it.
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

impl Bar {
    pub fn new(open: f64, high: f64, low: f64, close: f64) -> Self {
        Self { open, high, low, close, date: None }
    }

    /// Bar whose four prices all equal `close`.
    pub fn flat(close: f64) -> Self {
        Self::new(close, close, close, close)
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }
}

/// Indicator output aligned 1:1 with the bars it was computed from.
/// `None` marks positions where the lookback window is not yet full.
pub type IndicatorSeries = Vec<Option<f64>>;

/// Lesson subject area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    TechnicalAnalysis,
    FundamentalAnalysis,
    RiskManagement,
    Psychology,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::TechnicalAnalysis,
        Category::FundamentalAnalysis,
        Category::RiskManagement,
        Category::Psychology,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::TechnicalAnalysis => "technical-analysis",
            Category::FundamentalAnalysis => "fundamental-analysis",
            Category::RiskManagement => "risk-management",
            Category::Psychology => "psychology",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = AcademyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| AcademyError::InvalidLesson(format!("unknown category '{}'", s)))
    }
}

/// Lesson difficulty level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Difficulty {
    type Err = AcademyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "beginner" => Ok(Difficulty::Beginner),
            "intermediate" => Ok(Difficulty::Intermediate),
            "advanced" => Ok(Difficulty::Advanced),
            other => Err(AcademyError::InvalidLesson(format!("unknown difficulty '{}'", other))),
        }
    }
}

/// Every question offers exactly this many options.
pub const OPTION_COUNT: usize = 4;

/// Multiple-choice question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub prompt: String,
    pub options: [String; OPTION_COUNT],
    pub correct_index: usize,
    pub explanation: String,
}

impl Question {
    pub fn option(&self, index: usize) -> Option<&str> {
        self.options.get(index).map(String::as_str)
    }

    pub fn correct_text(&self) -> &str {
        self.option(self.correct_index).unwrap_or_default()
    }
}

/// A unit of content: a video plus its quiz
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: u32,
    pub title: String,
    pub description: String,
    pub video_ref: String,
    pub category: Category,
    #[serde(default)]
    pub difficulty: Difficulty,
    pub questions: Vec<Question>,
}

/// Who is acting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    Student,
}

/// Explicit identity passed to catalog, session and report calls
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserContext {
    pub name: String,
    pub role: Role,
}

impl UserContext {
    pub fn new(name: impl Into<String>, role: Role) -> Self {
        Self { name: name.into(), role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Chosen option per question index
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerSet(BTreeMap<usize, usize>);

impl AnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record (or replace) the option chosen for a question.
    pub fn select(&mut self, question: usize, option: usize) {
        self.0.insert(question, option);
    }

    pub fn get(&self, question: usize) -> Option<usize> {
        self.0.get(&question).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Indices in `0..total` without an answer.
    pub fn missing(&self, total: usize) -> Vec<usize> {
        (0..total).filter(|i| !self.0.contains_key(i)).collect()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

impl FromIterator<(usize, usize)> for AnswerSet {
    fn from_iter<I: IntoIterator<Item = (usize, usize)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Feedback for one question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionOutcome {
    pub chosen_text: String,
    pub correct_text: String,
    pub is_correct: bool,
    pub explanation: String,
}

/// Scored quiz
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub per_question: Vec<QuestionOutcome>,
    pub correct_count: usize,
    pub total: usize,
}

impl ScoreResult {
    /// `round(100 * correct / total)`, halves rounded up. An empty quiz is 0%.
    pub fn percentage(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        ((200 * self.correct_count + self.total) / (2 * self.total)) as u32
    }

    pub fn is_perfect(&self) -> bool {
        self.total > 0 && self.correct_count == self.total
    }

    /// Letter grade for the percentage
    pub fn grade(&self) -> &'static str {
        match self.percentage() {
            p if p >= 90 => "A",
            p if p >= 75 => "B",
            p if p >= 60 => "C",
            p if p >= 50 => "D",
            _ => "F",
        }
    }
}
