//! Card-by-card study flow: flipping, navigating and marking cards learned,
//! with the study achievement rules checked after each newly learned card.

use crate::CardWise;
use crate::achievements::{StudyContext, study_achievements};
use crate::api::{ApiError, CardWiseApi};
use crate::model::Flashcard;
use keeper::KeyValueStore;

/// In-memory state of one study session over a deck.
pub struct StudySession {
    pub deck_id: i64,
    pub deck_title: String,
    cards: Vec<Flashcard>,
    current: usize,
    flipped: bool,
    /// Cards marked learned during this session, not the deck's lifetime
    /// total. The session-scoped count is what the study rules key on.
    newly_learned: u32,
}

impl StudySession {
    pub fn new(deck_id: i64, deck_title: impl Into<String>, cards: Vec<Flashcard>) -> Self {
        Self {
            deck_id,
            deck_title: deck_title.into(),
            cards,
            current: 0,
            flipped: false,
            newly_learned: 0,
        }
    }

    pub fn cards(&self) -> &[Flashcard] {
        &self.cards
    }

    pub fn current_card(&self) -> Option<&Flashcard> {
        self.cards.get(self.current)
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn is_flipped(&self) -> bool {
        self.flipped
    }

    pub fn toggle_flip(&mut self) {
        self.flipped = !self.flipped;
    }

    pub fn newly_learned(&self) -> u32 {
        self.newly_learned
    }

    /// 0..=100, how far through the deck the user is (position, not learned
    /// count).
    pub fn progress_percentage(&self) -> u8 {
        if self.cards.is_empty() {
            return 0;
        }
        (((self.current + 1) as f64 / self.cards.len() as f64) * 100.0).round() as u8
    }

    /// Show the next card front-side up. `false` at the end of the deck.
    pub fn next(&mut self) -> bool {
        if self.current + 1 >= self.cards.len() {
            return false;
        }
        self.current += 1;
        self.flipped = false;
        true
    }

    /// Show the previous card front-side up. `false` at the start.
    pub fn previous(&mut self) -> bool {
        if self.current == 0 {
            return false;
        }
        self.current -= 1;
        self.flipped = false;
        true
    }
}

impl<A: CardWiseApi, L: KeyValueStore, S: KeyValueStore> CardWise<A, L, S> {
    /// Mark the current card as learned.
    ///
    /// The backend update comes first and its failure is surfaced: unlike
    /// the quiz bookkeeping, a learned flag that silently diverges between
    /// devices would be confusing, so the caller shows the error and the
    /// card stays unlearned. On success the local copy flips, the session
    /// count bumps for first-time learns, the study rules run and the view
    /// advances to the next card.
    pub async fn mark_learned(&self, session: &mut StudySession) -> Result<(), ApiError> {
        let Some(card) = session.current_card() else {
            return Ok(());
        };
        let newly = !card.learned;
        let mut updated = card.clone();
        updated.learned = true;
        self.api().update_flashcard(&updated).await?;

        session.cards[session.current].learned = true;
        if newly {
            session.newly_learned += 1;
            let ctx = StudyContext {
                newly_learned: session.newly_learned,
                total_cards: session.cards.len(),
            };
            self.unlock_all(study_achievements(&ctx)).await;
        }
        session.next();
        Ok(())
    }
}
