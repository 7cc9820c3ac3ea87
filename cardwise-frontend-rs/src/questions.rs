use rand::Rng;
use rand::seq::SliceRandom;

use crate::model::{Flashcard, Question, QuestionType};

/// Requested question count when the caller doesn't specify one. The caller
/// clamps to the deck size; see [`generate_questions`].
pub const DEFAULT_QUESTION_COUNT: usize = 10;

/// Turn a deck's flashcards into a randomized quiz.
///
/// The whole list is shuffled uniformly, then the first `count` cards become
/// identification questions (term as the prompt, definition as the expected
/// answer). Asking for more questions than there are cards just yields every
/// card; an empty deck yields an empty quiz.
pub fn generate_questions(
    flashcards: &[Flashcard],
    count: usize,
    rng: &mut impl Rng,
) -> Vec<Question> {
    let mut shuffled: Vec<&Flashcard> = flashcards.iter().collect();
    shuffled.shuffle(rng);

    shuffled
        .into_iter()
        .take(count)
        .map(|card| Question {
            id: card.id,
            question: card.term.clone(),
            question_type: QuestionType::Identification,
            correct_answer: card.definition.clone(),
        })
        .collect()
}
