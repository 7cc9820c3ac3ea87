//! Backend doubles shared by the unit tests: one that records everything and
//! one that is permanently offline.

use std::cell::{Cell, RefCell};

use crate::api::{ApiError, CardWiseApi};
use crate::model::{Achievement, Deck, Flashcard, ProgressEntry, ReviewEntry};
use keeper::HttpError;

fn offline() -> ApiError {
    ApiError::Http(HttpError::Network("offline".into()))
}

/// Every call fails the way a dead network does.
pub struct FailingApi;

impl CardWiseApi for FailingApi {
    async fn complete_quiz(&self, _user_id: &str, _deck_id: i64, _score: u8) -> Result<(), ApiError> {
        Err(offline())
    }

    async fn add_progress(&self, _user_id: &str, _entry: &ProgressEntry) -> Result<(), ApiError> {
        Err(offline())
    }

    async fn add_review(&self, _user_id: &str, _entry: &ReviewEntry) -> Result<(), ApiError> {
        Err(offline())
    }

    async fn track_study_time(&self, _user_id: &str, _minutes: u32) -> Result<(), ApiError> {
        Err(offline())
    }

    async fn achievements_for_user(&self, _user_id: &str) -> Result<Vec<Achievement>, ApiError> {
        Err(offline())
    }

    async fn unlock_achievement(
        &self,
        _user_id: &str,
        _title: &str,
        _description: &str,
    ) -> Result<(), ApiError> {
        Err(offline())
    }

    async fn decks_for_user(&self, _user_id: &str) -> Result<Vec<Deck>, ApiError> {
        Err(offline())
    }

    async fn update_flashcard(&self, _card: &Flashcard) -> Result<(), ApiError> {
        Err(offline())
    }
}

/// Accepts every call and records it. Unlocked achievements join the existing
/// list, so repeat unlocks within a test are visible to the dedup check.
/// `fail_reviews` turns the review endpoint (and only that one) offline, for
/// partial-outage scenarios.
#[derive(Default)]
pub struct RecordingApi {
    pub fail_reviews: Cell<bool>,
    pub completions: RefCell<Vec<(i64, u8)>>,
    pub progress: RefCell<Vec<ProgressEntry>>,
    pub reviews: RefCell<Vec<ReviewEntry>>,
    pub study_minutes: RefCell<Vec<u32>>,
    pub unlocked: RefCell<Vec<(String, String)>>,
    pub existing_achievements: RefCell<Vec<Achievement>>,
    pub decks: RefCell<Vec<Deck>>,
    pub updated_flashcards: RefCell<Vec<Flashcard>>,
}

impl CardWiseApi for RecordingApi {
    async fn complete_quiz(&self, _user_id: &str, deck_id: i64, score: u8) -> Result<(), ApiError> {
        self.completions.borrow_mut().push((deck_id, score));
        Ok(())
    }

    async fn add_progress(&self, _user_id: &str, entry: &ProgressEntry) -> Result<(), ApiError> {
        self.progress.borrow_mut().push(entry.clone());
        Ok(())
    }

    async fn add_review(&self, _user_id: &str, entry: &ReviewEntry) -> Result<(), ApiError> {
        if self.fail_reviews.get() {
            return Err(offline());
        }
        self.reviews.borrow_mut().push(entry.clone());
        Ok(())
    }

    async fn track_study_time(&self, _user_id: &str, minutes: u32) -> Result<(), ApiError> {
        self.study_minutes.borrow_mut().push(minutes);
        Ok(())
    }

    async fn achievements_for_user(&self, _user_id: &str) -> Result<Vec<Achievement>, ApiError> {
        Ok(self.existing_achievements.borrow().clone())
    }

    async fn unlock_achievement(
        &self,
        _user_id: &str,
        title: &str,
        description: &str,
    ) -> Result<(), ApiError> {
        self.unlocked
            .borrow_mut()
            .push((title.to_string(), description.to_string()));
        self.existing_achievements.borrow_mut().push(Achievement {
            title: title.to_string(),
            description: description.to_string(),
            unlocked: true,
            unlocked_at: None,
        });
        Ok(())
    }

    async fn decks_for_user(&self, _user_id: &str) -> Result<Vec<Deck>, ApiError> {
        Ok(self.decks.borrow().clone())
    }

    async fn update_flashcard(&self, card: &Flashcard) -> Result<(), ApiError> {
        self.updated_flashcards.borrow_mut().push(card.clone());
        Ok(())
    }
}
