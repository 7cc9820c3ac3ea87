use crate::model::{AnswerMap, AnsweredQuestion, Question, QuestionType, QuizResults};

/// Decide whether `answer` is a correct response to `question`.
///
/// Unanswered (absent or empty) is always incorrect. Identification questions
/// compare case-insensitively with surrounding whitespace trimmed; definitions
/// are arbitrary-language text, so the fold is full Unicode lowercasing, not
/// ASCII-only. The reserved choice-based types compare exactly, since their
/// answers are picked, not typed.
pub fn is_correct(question: &Question, answer: Option<&str>) -> bool {
    let Some(answer) = answer else {
        return false;
    };
    if answer.is_empty() {
        return false;
    }
    match question.question_type {
        QuestionType::Identification => {
            answer.trim().to_lowercase() == question.correct_answer.trim().to_lowercase()
        }
        QuestionType::MultipleChoice | QuestionType::TrueFalse => {
            answer == question.correct_answer
        }
    }
}

/// Aggregate a finished session's answers into counts, per-answer lists and a
/// rounded percentage score. Deterministic; an empty question list scores 0
/// rather than dividing by zero.
pub fn calculate_results(questions: &[Question], answers: &AnswerMap) -> QuizResults {
    let mut correct_answers = Vec::new();
    let mut incorrect_answers = Vec::new();

    for question in questions {
        let user_answer = answers.get(&question.id).map(String::as_str);
        let entry = AnsweredQuestion {
            flash_card_id: question.id,
            question: question.question.clone(),
            correct_answer: question.correct_answer.clone(),
            user_answer: user_answer.unwrap_or_default().to_string(),
        };
        if is_correct(question, user_answer) {
            correct_answers.push(entry);
        } else {
            incorrect_answers.push(entry);
        }
    }

    let correct_count = correct_answers.len() as u32;
    let incorrect_count = incorrect_answers.len() as u32;
    let score = if questions.is_empty() {
        0
    } else {
        ((correct_count as f64 / questions.len() as f64) * 100.0).round() as u8
    };

    QuizResults {
        correct_count,
        incorrect_count,
        correct_answers,
        incorrect_answers,
        score,
    }
}
