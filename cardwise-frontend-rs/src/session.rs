//! In-memory state of one quiz attempt, from the first question shown until
//! completion hands off to the results view.

use std::cell::Cell;

use rand::Rng;

use crate::model::{AnswerMap, Flashcard, Question};
use crate::questions::{DEFAULT_QUESTION_COUNT, generate_questions};

/// Whole-second quiz timer, advanced by the host once per second.
///
/// `Cell` receivers so a shared session can tick without a mutable borrow.
/// `stop` is permanent: ticks that race past the end of the quiz are ignored,
/// so the recorded duration is the duration at the moment of completion.
#[derive(Debug)]
pub struct QuizTimer {
    seconds: Cell<u32>,
    running: Cell<bool>,
}

impl QuizTimer {
    pub fn new() -> Self {
        Self {
            seconds: Cell::new(0),
            running: Cell::new(true),
        }
    }

    pub fn tick(&self) {
        if self.running.get() {
            self.seconds.set(self.seconds.get().saturating_add(1));
        }
    }

    pub fn elapsed(&self) -> u32 {
        self.seconds.get()
    }

    /// Freeze the timer and return the final duration. Idempotent.
    pub fn stop(&self) -> u32 {
        self.running.set(false);
        self.seconds.get()
    }
}

impl Default for QuizTimer {
    fn default() -> Self {
        Self::new()
    }
}

/// One quiz attempt over a deck.
pub struct QuizSession {
    pub deck_id: i64,
    pub deck_title: String,
    pub questions: Vec<Question>,
    pub answers: AnswerMap,
    current: usize,
    timer: QuizTimer,
}

impl QuizSession {
    /// Start a quiz over `flashcards`, asking for `requested` questions
    /// (default when `None`), clamped to the deck size. The timer starts
    /// immediately.
    pub fn new(
        deck_id: i64,
        deck_title: impl Into<String>,
        flashcards: &[Flashcard],
        requested: Option<usize>,
        rng: &mut impl Rng,
    ) -> Self {
        let count = requested.unwrap_or(DEFAULT_QUESTION_COUNT).min(flashcards.len());
        Self {
            deck_id,
            deck_title: deck_title.into(),
            questions: generate_questions(flashcards, count, rng),
            answers: AnswerMap::new(),
            current: 0,
            timer: QuizTimer::new(),
        }
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current)
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn is_last_question(&self) -> bool {
        self.current + 1 >= self.questions.len()
    }

    /// Latest answer wins; answering the same question again overwrites.
    pub fn record_answer(&mut self, question_id: i64, answer: String) {
        self.answers.insert(question_id, answer);
    }

    pub fn answer_for(&self, question_id: i64) -> Option<&str> {
        self.answers.get(&question_id).map(String::as_str)
    }

    /// Move to the next question. Returns `false` (and stays put) when
    /// already on the last one.
    pub fn advance(&mut self) -> bool {
        if self.is_last_question() {
            return false;
        }
        self.current += 1;
        true
    }

    pub fn tick(&self) {
        self.timer.tick();
    }

    pub fn elapsed(&self) -> u32 {
        self.timer.elapsed()
    }

    /// Stop the timer and return the total quiz duration in seconds.
    pub fn finish(&self) -> u32 {
        self.timer.stop()
    }
}
