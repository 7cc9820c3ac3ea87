//! Dual-write persistence: every record goes to the backend first and falls
//! back to a per-user list in local storage when the backend is unreachable.
//! Nothing in here surfaces a remote failure to its caller — the contract is
//! "best-effort, eventually somewhere", and the study flow is never
//! interrupted by a flaky connection.
//!
//! Local appends are synchronous read-modify-writes with no await point
//! inside, so a fan-out of concurrent writes cannot interleave on one key.

use chrono::Utc;
use keeper::store::{self, StoreError};

use crate::CardWise;
use crate::achievements::AchievementDef;
use crate::api::CardWiseApi;
use crate::model::{Achievement, ProgressEntry, QuizResultRecord, QuizSummary, ReviewEntry};
use keeper::KeyValueStore;

impl<A: CardWiseApi, L: KeyValueStore, S: KeyValueStore> CardWise<A, L, S> {
    fn achievements_key(&self) -> String {
        format!("achievements-{}", self.user_id())
    }

    fn progress_key(&self) -> String {
        format!("progress-{}", self.user_id())
    }

    fn reviews_key(&self) -> String {
        format!("reviews-{}", self.user_id())
    }

    fn study_time_key(&self) -> String {
        format!("study-time-{}", self.user_id())
    }

    /// Record the quiz completion itself. Purely best-effort; there is no
    /// local equivalent of this record (the session-scoped
    /// [`QuizResultRecord`] already covers the results view).
    pub async fn save_quiz_completion(&self, deck_id: i64, score: u8) -> Result<(), crate::api::ApiError> {
        self.api()
            .complete_quiz(self.user_id(), deck_id, score)
            .await
            .inspect_err(|e| log::warn!("Quiz completion call failed: {e}"))
    }

    /// Persist one per-question progress entry, remotely or locally.
    pub async fn save_progress(&self, entry: ProgressEntry) {
        if let Err(e) = self.api().add_progress(self.user_id(), &entry).await {
            log::warn!("Progress write failed, keeping a local copy: {e}");
            if let Err(e) = store::push_back(self.local(), &self.progress_key(), entry) {
                log::error!("Local progress fallback also failed: {e}");
            }
        }
    }

    /// Persist one review entry, remotely or locally.
    pub async fn save_review(&self, entry: ReviewEntry) {
        if let Err(e) = self.api().add_review(self.user_id(), &entry).await {
            log::warn!("Review write failed, keeping a local copy: {e}");
            if let Err(e) = store::push_back(self.local(), &self.reviews_key(), entry) {
                log::error!("Local review fallback also failed: {e}");
            }
        }
    }

    /// Add studied minutes to the user's running total, remotely or locally.
    pub async fn track_study_time(&self, minutes: u32) {
        if let Err(e) = self.api().track_study_time(self.user_id(), minutes).await {
            log::warn!("Study time write failed, keeping a local total: {e}");
            let key = self.study_time_key();
            let total: u32 = self
                .local()
                .get(&key)
                .and_then(|raw| raw.parse().ok())
                .unwrap_or(0);
            if let Err(e) = self.local().set(&key, &(total + minutes).to_string()) {
                log::error!("Local study time fallback also failed: {e}");
            }
        }
    }

    /// Unlock an achievement for this user. Returns whether it was *newly*
    /// unlocked — re-satisfying a condition never duplicates the record or
    /// resets its timestamp.
    ///
    /// The prior-unlock check reads the remote list first and degrades to an
    /// empty list when that read fails, so a flaky backend can't block an
    /// unlock. A remote unlock that fails falls back to the local list; the
    /// fallback can't see other devices, so it still counts as newly unlocked
    /// unless this device already recorded it.
    pub async fn unlock_achievement(&self, def: &AchievementDef) -> bool {
        let existing = match self.api().achievements_for_user(self.user_id()).await {
            Ok(existing) => existing,
            Err(e) => {
                log::warn!("Could not fetch existing achievements, proceeding with unlock: {e}");
                Vec::new()
            }
        };

        if existing
            .iter()
            .any(|a| a.title == def.title && a.unlocked)
        {
            return false;
        }

        match self
            .api()
            .unlock_achievement(self.user_id(), def.title, def.description)
            .await
        {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Achievement unlock failed, keeping a local copy: {e}");
                self.save_achievement_locally(def)
            }
        }
    }

    /// Append to the local unlock list unless the title is already there.
    /// Returns whether the record is new.
    fn save_achievement_locally(&self, def: &AchievementDef) -> bool {
        let key = self.achievements_key();
        let existing: Vec<Achievement> = store::read_list(self.local(), &key);
        if existing.iter().any(|a| a.title == def.title) {
            return false;
        }
        let record = Achievement {
            title: def.title.to_string(),
            description: def.description.to_string(),
            unlocked: true,
            unlocked_at: Some(Utc::now()),
        };
        // Newest first, so the achievements page shows recent unlocks on top.
        if let Err(e) = store::push_front(self.local(), &key, record) {
            log::error!("Local achievement fallback failed: {e}");
        }
        true
    }

    pub fn local_achievements(&self) -> Vec<Achievement> {
        store::read_list(self.local(), &self.achievements_key())
    }

    /// Everything the user has unlocked, from both stores: the remote list
    /// (empty when unreachable) merged with local fallback records, deduped
    /// by title with the remote record winning.
    pub async fn all_achievements(&self) -> Vec<Achievement> {
        let mut merged = match self.api().achievements_for_user(self.user_id()).await {
            Ok(remote) => remote,
            Err(e) => {
                log::warn!("Could not fetch achievements, showing local ones only: {e}");
                Vec::new()
            }
        };
        for local in self.local_achievements() {
            if !merged.iter().any(|a| a.title == local.title) {
                merged.push(local);
            }
        }
        merged
    }

    /// The one fatal write in the quiz-completion flow: without this record
    /// the results view has nothing to read, so the error propagates.
    pub fn write_quiz_result(&self, record: &QuizResultRecord) -> Result<(), StoreError> {
        let raw = serde_json::to_string(record)?;
        self.session_store()
            .set(&quiz_result_key(record.deck_id), &raw)
    }

    pub fn read_quiz_result(&self, deck_id: i64) -> Option<QuizResultRecord> {
        let raw = self.session_store().get(&quiz_result_key(deck_id))?;
        match serde_json::from_str(&raw) {
            Ok(record) => Some(record),
            Err(e) => {
                log::warn!("Discarding corrupt quiz result for deck {deck_id}: {e}");
                None
            }
        }
    }

    /// Local-only summary line appended after every quiz, alongside the
    /// per-question review entries.
    pub fn save_quiz_summary_locally(&self, summary: QuizSummary) {
        if let Err(e) = store::push_back(self.local(), &self.reviews_key(), summary) {
            log::error!("Local quiz summary write failed: {e}");
        }
    }
}

fn quiz_result_key(deck_id: i64) -> String {
    format!("quizResult-{deck_id}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ScoreComparison;
    use crate::test_support::{FailingApi, RecordingApi};
    use futures::executor::block_on;
    use keeper::MemoryStore;

    fn failing_client() -> CardWise<FailingApi, MemoryStore, MemoryStore> {
        CardWise::new(FailingApi, MemoryStore::new(), MemoryStore::new(), "u1")
    }

    fn entry(id: i64) -> ProgressEntry {
        ProgressEntry {
            flash_card_id: id,
            score: 100,
            time_spent: 3,
            score_comparison: ScoreComparison::Excellent,
        }
    }

    #[test]
    fn progress_falls_back_to_local_list() {
        let client = failing_client();
        block_on(client.save_progress(entry(1)));
        block_on(client.save_progress(entry(2)));
        let saved: Vec<ProgressEntry> = store::read_list(client.local(), "progress-u1");
        assert_eq!(saved.len(), 2);
        assert_eq!(saved[0].flash_card_id, 1);
        assert_eq!(saved[1].flash_card_id, 2);
    }

    #[test]
    fn review_falls_back_to_local_list() {
        let client = failing_client();
        block_on(client.save_review(ReviewEntry {
            flash_card_id: 4,
            review_correct_answer: "mitochondria".into(),
            review_incorrect_answer: Some("ribosome".into()),
            deck_id: 1,
            deck_title: "Biology".into(),
            question_text: "Powerhouse of the cell".into(),
        }));
        let saved: Vec<ReviewEntry> = store::read_list(client.local(), "reviews-u1");
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].review_incorrect_answer.as_deref(), Some("ribosome"));
    }

    #[test]
    fn study_time_accumulates_locally() {
        let client = failing_client();
        block_on(client.track_study_time(3));
        block_on(client.track_study_time(2));
        assert_eq!(client.local().get("study-time-u1").as_deref(), Some("5"));
    }

    #[test]
    fn unlock_is_idempotent_locally() {
        let client = failing_client();
        let def = AchievementDef {
            title: "Quiz Taker",
            description: "Completed your first quiz",
        };
        assert!(block_on(client.unlock_achievement(&def)));
        let first: Vec<Achievement> = client.local_achievements();
        assert_eq!(first.len(), 1);
        let first_unlocked_at = first[0].unlocked_at;
        assert!(first[0].unlocked);

        // Re-satisfying the condition must not duplicate or re-stamp.
        assert!(!block_on(client.unlock_achievement(&def)));
        let second: Vec<Achievement> = client.local_achievements();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].unlocked_at, first_unlocked_at);
    }

    #[test]
    fn unlock_skips_remotely_unlocked_achievements() {
        let api = RecordingApi::default();
        api.existing_achievements.borrow_mut().push(Achievement {
            title: "Quiz Taker".into(),
            description: "Completed your first quiz".into(),
            unlocked: true,
            unlocked_at: None,
        });
        let client = CardWise::new(api, MemoryStore::new(), MemoryStore::new(), "u1");
        let def = AchievementDef {
            title: "Quiz Taker",
            description: "Completed your first quiz",
        };
        assert!(!block_on(client.unlock_achievement(&def)));
        assert!(client.api().unlocked.borrow().is_empty());
    }

    #[test]
    fn unlock_proceeds_when_achievement_read_fails() {
        // A failed read degrades to "nothing unlocked yet" instead of
        // blocking the unlock path.
        let client = failing_client();
        let def = AchievementDef {
            title: "High Achiever",
            description: "Scored 80% or higher on a quiz",
        };
        assert!(block_on(client.unlock_achievement(&def)));
        assert_eq!(client.local_achievements().len(), 1);
    }

    #[test]
    fn merged_achievements_dedupe_by_title() {
        let api = RecordingApi::default();
        api.existing_achievements.borrow_mut().push(Achievement {
            title: "Quiz Taker".into(),
            description: "Completed your first quiz".into(),
            unlocked: true,
            unlocked_at: None,
        });
        let client = CardWise::new(api, MemoryStore::new(), MemoryStore::new(), "u1");
        client.save_achievement_locally(&AchievementDef {
            title: "Quiz Taker",
            description: "Completed your first quiz",
        });
        client.save_achievement_locally(&AchievementDef {
            title: "First Steps",
            description: "Started your first study session",
        });
        let all = block_on(client.all_achievements());
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn quiz_result_round_trips_through_session_store() {
        let client = failing_client();
        let record = QuizResultRecord {
            deck_id: 12,
            title: "Biology".into(),
            total_questions: 5,
            correct_count: 5,
            incorrect_count: 0,
            time_spent: 60,
            score: 100,
            date: Utc::now(),
            questions: Vec::new(),
        };
        client.write_quiz_result(&record).unwrap();
        assert_eq!(client.read_quiz_result(12), Some(record));
        assert_eq!(client.read_quiz_result(13), None);
    }
}
