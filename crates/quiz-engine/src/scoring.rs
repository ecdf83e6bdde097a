//! Quiz Scoring
//!
//! Compares a learner's answers against a lesson's answer key.

use academy_core::{AcademyError, AnswerSet, Lesson, QuestionOutcome, ScoreResult};

/// Score a fully answered lesson.
///
/// Every index in `0..questions.len()` must have an answer, otherwise the
/// submission is rejected with the list of missing indices. An answer that
/// points outside the option list counts as wrong.
pub fn score(lesson: &Lesson, answers: &AnswerSet) -> Result<ScoreResult, AcademyError> {
    let missing = answers.missing(lesson.questions.len());
    if !missing.is_empty() {
        return Err(AcademyError::IncompleteSubmission { missing });
    }

    let mut per_question = Vec::with_capacity(lesson.questions.len());
    let mut correct_count = 0;

    for (i, question) in lesson.questions.iter().enumerate() {
        let chosen = answers.get(i);
        let is_correct = chosen == Some(question.correct_index);
        if is_correct {
            correct_count += 1;
        }

        per_question.push(QuestionOutcome {
            chosen_text: chosen
                .and_then(|c| question.option(c))
                .unwrap_or_default()
                .to_string(),
            correct_text: question.correct_text().to_string(),
            is_correct,
            explanation: question.explanation.clone(),
        });
    }

    Ok(ScoreResult {
        per_question,
        correct_count,
        total: lesson.questions.len(),
    })
}

/// One-line feedback, e.g. "1/2 correct (50%) - grade D"
pub fn summary(result: &ScoreResult) -> String {
    format!(
        "{}/{} correct ({}%) - grade {}",
        result.correct_count,
        result.total,
        result.percentage(),
        result.grade()
    )
}
