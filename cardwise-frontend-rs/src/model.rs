//! Domain types shared across the core. Wire-facing structs rename to
//! camelCase because that is what the HTTP collaborator and the stored JSON
//! records use.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Flashcard {
    pub id: i64,
    pub term: String,
    pub definition: String,
    #[serde(default)]
    pub learned: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Deck {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub flashcards: Vec<Flashcard>,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum QuestionType {
    #[serde(rename = "identification")]
    Identification,
    #[serde(rename = "multiple-choice")]
    MultipleChoice,
    #[serde(rename = "true-false")]
    TrueFalse,
}

/// One quiz question, derived from exactly one flashcard (`id` is the
/// flashcard's id) and alive only for the session that generated it.
///
/// Only [`QuestionType::Identification`] is generated today; the other
/// variants exist so future generation paths type-check.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: i64,
    pub question: String,
    pub question_type: QuestionType,
    pub correct_answer: String,
}

/// What the user typed/selected, keyed by question id. In-memory only.
pub type AnswerMap = HashMap<i64, String>;

/// One evaluated answer, as carried in [`QuizResults`].
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnsweredQuestion {
    pub flash_card_id: i64,
    pub question: String,
    pub correct_answer: String,
    /// Empty string when the question was never answered.
    pub user_answer: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuizResults {
    pub correct_count: u32,
    pub incorrect_count: u32,
    pub correct_answers: Vec<AnsweredQuestion>,
    pub incorrect_answers: Vec<AnsweredQuestion>,
    /// 0..=100, rounded percentage. Defined as 0 for an empty quiz.
    pub score: u8,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResultQuestion {
    pub question: String,
    pub question_type: QuestionType,
    pub correct_answer: String,
    pub user_answer: String,
}

/// Written once to session storage at `quizResult-{deckId}` when a quiz
/// completes, read once by the results view, never updated. Retaking the quiz
/// overwrites it wholesale.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuizResultRecord {
    pub deck_id: i64,
    pub title: String,
    pub total_questions: usize,
    pub correct_count: u32,
    pub incorrect_count: u32,
    pub time_spent: u32,
    pub score: u8,
    pub date: DateTime<Utc>,
    pub questions: Vec<ResultQuestion>,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScoreComparison {
    Excellent,
    Good,
    Fair,
    NeedsImprovement,
}

impl ScoreComparison {
    /// Per-question scores are only ever 0 or 100, so only the extremes of
    /// this mapping are exercised in practice.
    pub fn for_score(score: u8) -> Self {
        match score {
            90.. => ScoreComparison::Excellent,
            75..=89 => ScoreComparison::Good,
            60..=74 => ScoreComparison::Fair,
            _ => ScoreComparison::NeedsImprovement,
        }
    }
}

/// Per-flashcard performance record, created at quiz completion and never
/// mutated afterwards.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEntry {
    pub flash_card_id: i64,
    /// 0 or 100.
    pub score: u8,
    pub time_spent: u32,
    pub score_comparison: ScoreComparison,
}

/// Append-only record of a specific right/wrong answer, for later study
/// review.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReviewEntry {
    pub flash_card_id: i64,
    pub review_correct_answer: String,
    /// `None` for the sampled correct-answer reviews.
    pub review_incorrect_answer: Option<String>,
    pub deck_id: i64,
    pub deck_title: String,
    pub question_text: String,
}

/// Per-user unlock state. The unlock transitions once and never back;
/// `unlocked_at` is set on the first unlock and must survive re-unlocks.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub unlocked: bool,
    #[serde(default)]
    pub unlocked_at: Option<DateTime<Utc>>,
}

/// Summary record appended to the local review list after every quiz, tagged
/// so the review view can tell it apart from per-question entries.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuizSummary {
    #[serde(rename = "type")]
    pub record_type: String,
    pub deck_id: i64,
    pub deck_title: String,
    pub score: u8,
    pub correct_count: u32,
    pub total_questions: usize,
    pub time_spent: u32,
}

impl QuizSummary {
    pub const TYPE: &'static str = "quiz_summary";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_type_uses_wire_strings() {
        assert_eq!(
            serde_json::to_string(&QuestionType::Identification).unwrap(),
            "\"identification\""
        );
        assert_eq!(
            serde_json::to_string(&QuestionType::MultipleChoice).unwrap(),
            "\"multiple-choice\""
        );
    }

    #[test]
    fn score_comparison_extremes() {
        assert_eq!(ScoreComparison::for_score(100), ScoreComparison::Excellent);
        assert_eq!(
            ScoreComparison::for_score(0),
            ScoreComparison::NeedsImprovement
        );
    }

    #[test]
    fn progress_entry_serializes_camel_case() {
        let entry = ProgressEntry {
            flash_card_id: 7,
            score: 100,
            time_spent: 12,
            score_comparison: ScoreComparison::Excellent,
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["flashCardId"], 7);
        assert_eq!(json["scoreComparison"], "EXCELLENT");
    }
}
