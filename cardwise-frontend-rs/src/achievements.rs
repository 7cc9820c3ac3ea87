//! Achievement rules and the unlock driver. The rules are pure functions from
//! a context snapshot to the set of satisfied achievements; all storage and
//! idempotence concerns live in `persistence.rs`.

use crate::CardWise;
use crate::api::CardWiseApi;
use keeper::KeyValueStore;

/// Static identity of an achievement. The title doubles as the dedup key in
/// both the backend and the local fallback list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AchievementDef {
    pub title: &'static str,
    pub description: &'static str,
}

/// Snapshot of a finished quiz, taken once at completion.
#[derive(Clone, Copy, Debug)]
pub struct QuizContext {
    /// Rounded percentage, 0..=100.
    pub score: u8,
    /// Whole-quiz duration in seconds.
    pub time_spent: u32,
    pub question_count: usize,
}

/// Snapshot taken right after a flashcard is marked learned.
#[derive(Clone, Copy, Debug)]
pub struct StudyContext {
    /// Cards newly marked learned this session, after the current one.
    pub newly_learned: u32,
    /// Deck size.
    pub total_cards: usize,
}

pub const QUIZ_TAKER: AchievementDef = AchievementDef {
    title: "Quiz Taker",
    description: "Completed your first quiz",
};
pub const PERFECT_SCORE: AchievementDef = AchievementDef {
    title: "Perfect Score",
    description: "Achieved a perfect score on a quiz",
};
pub const HIGH_ACHIEVER: AchievementDef = AchievementDef {
    title: "High Achiever",
    description: "Scored 80% or higher on a quiz",
};
pub const SPEED_LEARNER: AchievementDef = AchievementDef {
    title: "Speed Learner",
    description: "Completed a quiz in record time",
};
pub const LEARNING_JOURNEY: AchievementDef = AchievementDef {
    title: "Learning Journey",
    description: "Get 0% on a quiz",
};

pub const FIRST_STEPS: AchievementDef = AchievementDef {
    title: "First Steps",
    description: "Started your first study session",
};
pub const LEARNING_BEGINS: AchievementDef = AchievementDef {
    title: "Learning Begins",
    description: "Marked your first flashcard as learned",
};
pub const GETTING_STARTED: AchievementDef = AchievementDef {
    title: "Getting Started",
    description: "Learned 5 flashcards",
};
pub const DECK_MASTER: AchievementDef = AchievementDef {
    title: "Deck Master",
    description: "Completed an entire flashcard deck",
};

/// Exact-match deck-count milestones: creating the nth deck (and only the
/// nth) earns the badge. Deleting back below a milestone and re-creating does
/// not re-award thanks to the unlock idempotence.
pub const DECK_MILESTONES: [(usize, AchievementDef); 3] = [
    (
        1,
        AchievementDef {
            title: "First Deck Creator",
            description: "Created your first flashcard deck!",
        },
    ),
    (
        5,
        AchievementDef {
            title: "Deck Builder",
            description: "Create 5 flashcard decks",
        },
    ),
    (
        10,
        AchievementDef {
            title: "Master Creator",
            description: "Create 10 flashcard decks",
        },
    ),
];

/// Every quiz rule whose condition the snapshot satisfies, in declaration
/// order. Completing any quiz earns at least [`QUIZ_TAKER`].
pub fn quiz_achievements(ctx: &QuizContext) -> Vec<AchievementDef> {
    let mut earned = vec![QUIZ_TAKER];
    if ctx.score == 100 {
        earned.push(PERFECT_SCORE);
    }
    if ctx.score >= 80 {
        earned.push(HIGH_ACHIEVER);
    }
    if ctx.time_spent < 120 && ctx.question_count >= 5 {
        earned.push(SPEED_LEARNER);
    }
    if ctx.score == 0 {
        earned.push(LEARNING_JOURNEY);
    }
    earned
}

/// Every study rule the snapshot satisfies. Marking any card earns at least
/// [`FIRST_STEPS`].
pub fn study_achievements(ctx: &StudyContext) -> Vec<AchievementDef> {
    let mut earned = vec![FIRST_STEPS];
    if ctx.newly_learned == 1 {
        earned.push(LEARNING_BEGINS);
    }
    if ctx.newly_learned >= 5 {
        earned.push(GETTING_STARTED);
    }
    if ctx.total_cards > 0 && ctx.newly_learned as usize == ctx.total_cards {
        earned.push(DECK_MASTER);
    }
    earned
}

pub fn deck_milestone(deck_count: usize) -> Option<AchievementDef> {
    DECK_MILESTONES
        .iter()
        .find(|(count, _)| *count == deck_count)
        .map(|(_, def)| *def)
}

impl<A: CardWiseApi, L: KeyValueStore, S: KeyValueStore> CardWise<A, L, S> {
    /// Try to unlock every satisfied achievement, returning the ones that
    /// were newly unlocked in rule order.
    ///
    /// Unlocks run one after another: each one re-reads the unlocked list, so
    /// running them concurrently could double-unlock within a batch.
    pub async fn unlock_all(&self, defs: Vec<AchievementDef>) -> Vec<AchievementDef> {
        let mut newly = Vec::new();
        for def in defs {
            if self.unlock_achievement(&def).await {
                newly.push(def);
            }
        }
        // The toast only ever shows one achievement, the most recent.
        if let Some(last) = newly.last() {
            self.notify_achievement(*last);
        }
        newly
    }

    /// Check whether the user's current deck count sits exactly on a
    /// milestone and unlock it if so. A failed deck fetch is not an error
    /// worth surfacing, the next deck save will check again.
    pub async fn check_deck_achievement(&self) -> Option<AchievementDef> {
        let decks = match self.api().decks_for_user(self.user_id()).await {
            Ok(decks) => decks,
            Err(e) => {
                log::warn!("Deck fetch for milestone check failed: {e}");
                return None;
            }
        };
        let milestone = deck_milestone(decks.len())?;
        if self.unlock_achievement(&milestone).await {
            self.notify_achievement(milestone);
            Some(milestone)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FailingApi, RecordingApi};
    use futures::executor::block_on;
    use keeper::MemoryStore;

    #[test]
    fn perfect_fast_quiz_earns_everything_but_learning_journey() {
        let earned = quiz_achievements(&QuizContext {
            score: 100,
            time_spent: 60,
            question_count: 10,
        });
        assert_eq!(
            earned,
            vec![QUIZ_TAKER, PERFECT_SCORE, HIGH_ACHIEVER, SPEED_LEARNER]
        );
    }

    #[test]
    fn zero_score_earns_learning_journey() {
        let earned = quiz_achievements(&QuizContext {
            score: 0,
            time_spent: 300,
            question_count: 10,
        });
        assert_eq!(earned, vec![QUIZ_TAKER, LEARNING_JOURNEY]);
    }

    #[test]
    fn speed_learner_needs_both_speed_and_length() {
        let fast_but_short = QuizContext {
            score: 50,
            time_spent: 30,
            question_count: 4,
        };
        assert!(!quiz_achievements(&fast_but_short).contains(&SPEED_LEARNER));
        let long_but_slow = QuizContext {
            score: 50,
            time_spent: 120,
            question_count: 10,
        };
        assert!(!quiz_achievements(&long_but_slow).contains(&SPEED_LEARNER));
        let both = QuizContext {
            score: 50,
            time_spent: 119,
            question_count: 5,
        };
        assert!(quiz_achievements(&both).contains(&SPEED_LEARNER));
    }

    #[test]
    fn deck_master_requires_the_whole_deck() {
        let partial = StudyContext {
            newly_learned: 7,
            total_cards: 8,
        };
        assert!(!study_achievements(&partial).contains(&DECK_MASTER));
        let complete = StudyContext {
            newly_learned: 8,
            total_cards: 8,
        };
        assert!(study_achievements(&complete).contains(&DECK_MASTER));
    }

    #[test]
    fn catalog_wording_matches_the_published_badges() {
        // Descriptions are persisted with each unlock, so the wording is part
        // of the contract with the achievements page.
        assert_eq!(SPEED_LEARNER.description, "Completed a quiz in record time");
        assert_eq!(LEARNING_JOURNEY.description, "Get 0% on a quiz");
        assert_eq!(GETTING_STARTED.description, "Learned 5 flashcards");
        assert_eq!(DECK_MASTER.description, "Completed an entire flashcard deck");
        assert_eq!(
            deck_milestone(1).map(|d| d.description),
            Some("Created your first flashcard deck!")
        );
        assert_eq!(
            deck_milestone(5).map(|d| d.description),
            Some("Create 5 flashcard decks")
        );
        assert_eq!(
            deck_milestone(10).map(|d| d.description),
            Some("Create 10 flashcard decks")
        );
    }

    #[test]
    fn milestones_match_exactly() {
        assert_eq!(deck_milestone(1).map(|d| d.title), Some("First Deck Creator"));
        assert_eq!(deck_milestone(5).map(|d| d.title), Some("Deck Builder"));
        assert_eq!(deck_milestone(10).map(|d| d.title), Some("Master Creator"));
        assert_eq!(deck_milestone(4), None);
        assert_eq!(deck_milestone(6), None);
        assert_eq!(deck_milestone(11), None);
    }

    #[test]
    fn unlock_all_reports_only_new_unlocks_and_notifies_the_last() {
        let client = CardWise::new(FailingApi, MemoryStore::new(), MemoryStore::new(), "u1");
        let first = block_on(client.unlock_all(vec![QUIZ_TAKER, HIGH_ACHIEVER]));
        assert_eq!(first, vec![QUIZ_TAKER, HIGH_ACHIEVER]);
        assert_eq!(
            client.take_achievement_notification(),
            Some(HIGH_ACHIEVER)
        );

        let second = block_on(client.unlock_all(vec![QUIZ_TAKER, PERFECT_SCORE]));
        assert_eq!(second, vec![PERFECT_SCORE]);
        assert_eq!(client.take_achievement_notification(), Some(PERFECT_SCORE));
        // Taking the notification clears it.
        assert_eq!(client.take_achievement_notification(), None);
    }

    #[test]
    fn deck_milestone_check_unlocks_on_exact_count() {
        use crate::model::Deck;
        let api = RecordingApi::default();
        *api.decks.borrow_mut() = (0..5)
            .map(|i| Deck {
                id: i,
                title: format!("deck {i}"),
                flashcards: Vec::new(),
            })
            .collect();
        let client = CardWise::new(api, MemoryStore::new(), MemoryStore::new(), "u1");
        let unlocked = block_on(client.check_deck_achievement());
        assert_eq!(unlocked.map(|d| d.title), Some("Deck Builder"));
        assert_eq!(client.api().unlocked.borrow().len(), 1);
    }

    #[test]
    fn deck_milestone_check_swallows_fetch_failure() {
        let client = CardWise::new(FailingApi, MemoryStore::new(), MemoryStore::new(), "u1");
        assert_eq!(block_on(client.check_deck_achievement()), None);
    }
}
