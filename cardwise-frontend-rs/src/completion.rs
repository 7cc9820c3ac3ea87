//! Quiz completion: freezes the timer, evaluates the answers, stores the
//! result for the results view, fans the bookkeeping writes out concurrently
//! and walks the tally overlay through its stages, finishing with a
//! navigation handoff.

use chrono::Utc;
use futures::FutureExt;
use futures::future::LocalBoxFuture;
use keeper::StoreError;
use keeper::settle::settle_all;

use crate::CardWise;
use crate::achievements::{QuizContext, quiz_achievements};
use crate::api::{ApiError, CardWiseApi};
use crate::model::{
    ProgressEntry, QuizResultRecord, QuizResults, QuizSummary, ResultQuestion, ReviewEntry,
    ScoreComparison,
};
use crate::results::calculate_results;
use crate::session::QuizSession;
use keeper::KeyValueStore;

/// How long the finished overlay stays on screen before navigating. The host
/// passes a timer of this length as the `hold` future.
pub const COMPLETE_HOLD_MS: u32 = 1500;

/// How many correct answers get a review entry, alongside every incorrect
/// one.
const CORRECT_REVIEW_SAMPLES: usize = 2;

/// Where the flow lands after completion; the host maps this onto its router.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    QuizResults { deck_id: i64 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TallyStep {
    Calculating,
    Tallying,
    Saving,
    Tracking,
    Updating,
    CheckingAchievements,
    Complete,
}

impl TallyStep {
    pub fn progress(self) -> u8 {
        match self {
            TallyStep::Calculating => 10,
            TallyStep::Tallying => 30,
            TallyStep::Saving => 50,
            TallyStep::Tracking => 70,
            TallyStep::Updating => 85,
            TallyStep::CheckingAchievements => 90,
            TallyStep::Complete => 100,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TallyStep::Calculating => "Calculating results...",
            TallyStep::Tallying => "Tallying answers...",
            TallyStep::Saving => "Saving quiz results...",
            TallyStep::Tracking => "Tracking flashcard progress...",
            TallyStep::Updating => "Updating learning history...",
            TallyStep::CheckingAchievements => "Checking achievements...",
            TallyStep::Complete => "All done!",
        }
    }
}

/// Everything the tally overlay renders. Owned by the client behind a
/// `RefCell`; the registered listener sees each change.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TallyState {
    pub is_tallying_score: bool,
    /// 0..=100, monotone within one completion run.
    pub progress: u8,
    pub step: &'static str,
    /// Animated counter, climbing toward `target_score`.
    pub score: u8,
    /// Animated counter, climbing toward `target_correct`.
    pub correct: u32,
    pub target_score: u8,
    pub target_correct: u32,
    pub complete: bool,
}

impl TallyState {
    fn enter(&mut self, step: TallyStep) {
        self.progress = step.progress();
        self.step = step.label();
    }

    /// One animation frame: the score climbs by 2 and the correct counter by
    /// 1, never overshooting. Returns whether anything moved.
    pub fn animate_step(&mut self) -> bool {
        let mut moved = false;
        if self.score < self.target_score {
            self.score = (self.score + 2).min(self.target_score);
            moved = true;
        }
        if self.correct < self.target_correct {
            self.correct += 1;
            moved = true;
        }
        moved
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CompleteQuizError {
    /// The session-store write failed; without it the results view would
    /// render nothing, so this is the one write that aborts completion.
    #[error("could not store the quiz result: {0}")]
    Store(#[from] StoreError),
}

impl<A: CardWiseApi, L: KeyValueStore, S: KeyValueStore> CardWise<A, L, S> {
    /// Advance the tally counters by one frame, driven by the host's
    /// animation interval. Returns `false` once both counters have reached
    /// their targets.
    pub fn advance_tally_animation(&self) -> bool {
        let mut moved = false;
        self.set_tally(|t| moved = t.animate_step());
        moved
    }

    /// Run the whole completion flow for a finished session.
    ///
    /// The result record write is the only fatal step. Every remote write
    /// after it is fanned out concurrently and settled as a batch, so one
    /// failure never blocks the others and never fails the quiz. `hold`
    /// keeps the finished overlay visible (the host passes a
    /// [`COMPLETE_HOLD_MS`] timer); navigation happens by returning the
    /// route, not by side effect.
    pub async fn complete_quiz(
        &self,
        session: &QuizSession,
        hold: impl Future<Output = ()>,
    ) -> Result<Route, CompleteQuizError> {
        let time_spent = session.finish();

        self.set_tally(|t| {
            *t = TallyState {
                is_tallying_score: true,
                ..TallyState::default()
            };
            t.enter(TallyStep::Calculating);
        });
        let results = calculate_results(&session.questions, &session.answers);

        self.set_tally(|t| {
            t.enter(TallyStep::Tallying);
            t.target_score = results.score;
            t.target_correct = results.correct_count;
        });

        self.set_tally(|t| t.enter(TallyStep::Saving));
        let record = build_result_record(session, &results, time_spent);
        if let Err(e) = self.write_quiz_result(&record) {
            self.set_tally(|t| t.is_tallying_score = false);
            return Err(e.into());
        }

        self.save_quiz_summary_locally(QuizSummary {
            record_type: QuizSummary::TYPE.to_string(),
            deck_id: session.deck_id,
            deck_title: session.deck_title.clone(),
            score: results.score,
            correct_count: results.correct_count,
            total_questions: session.questions.len(),
            time_spent,
        });

        // The whole fan-out is dispatched and settled under the saving stage;
        // the tracking and updating stages are cosmetic advances after it.
        let outcomes = settle_all(self.bookkeeping_writes(session, &results, time_spent)).await;
        let failed = outcomes.iter().filter(|o| o.is_err()).count();
        if failed > 0 {
            log::warn!(
                "{failed} of {} quiz bookkeeping writes did not reach the backend",
                outcomes.len()
            );
        }
        self.set_tally(|t| t.enter(TallyStep::Tracking));
        self.set_tally(|t| t.enter(TallyStep::Updating));

        self.set_tally(|t| t.enter(TallyStep::CheckingAchievements));
        self.unlock_all(quiz_achievements(&QuizContext {
            score: results.score,
            time_spent,
            question_count: session.questions.len(),
        }))
        .await;

        self.set_tally(|t| {
            t.enter(TallyStep::Complete);
            t.score = t.target_score;
            t.correct = t.target_correct;
            t.complete = true;
        });

        hold.await;
        Ok(Route::QuizResults {
            deck_id: session.deck_id,
        })
    }

    /// Every best-effort write the completion triggers, as one batch of
    /// futures for [`settle_all`]. The dual-write items recover internally
    /// and always settle `Ok`; the purely-remote items surface their error
    /// into the batch outcome.
    fn bookkeeping_writes<'a>(
        &'a self,
        session: &'a QuizSession,
        results: &QuizResults,
        time_spent: u32,
    ) -> Vec<LocalBoxFuture<'a, Result<(), ApiError>>> {
        let mut writes: Vec<LocalBoxFuture<'a, Result<(), ApiError>>> = Vec::new();

        writes.push(
            self.save_quiz_completion(session.deck_id, results.score)
                .boxed_local(),
        );

        let per_question_time = if session.questions.is_empty() {
            0
        } else {
            (time_spent as f64 / session.questions.len() as f64).round() as u32
        };
        for question in &session.questions {
            // Unanswered questions count against the score but leave no
            // progress trail.
            let Some(answer) = session.answer_for(question.id) else {
                continue;
            };
            let score = if crate::results::is_correct(question, Some(answer)) {
                100
            } else {
                0
            };
            let entry = ProgressEntry {
                flash_card_id: question.id,
                score,
                time_spent: per_question_time,
                score_comparison: ScoreComparison::for_score(score),
            };
            writes.push(async move { Ok(self.save_progress(entry).await) }.boxed_local());
        }

        let minutes = time_spent.div_ceil(60);
        writes.push(async move { Ok(self.track_study_time(minutes).await) }.boxed_local());

        for wrong in &results.incorrect_answers {
            let entry = ReviewEntry {
                flash_card_id: wrong.flash_card_id,
                review_correct_answer: wrong.correct_answer.clone(),
                review_incorrect_answer: Some(wrong.user_answer.clone()),
                deck_id: session.deck_id,
                deck_title: session.deck_title.clone(),
                question_text: wrong.question.clone(),
            };
            writes.push(async move { Ok(self.save_review(entry).await) }.boxed_local());
        }

        // A small sample of correct answers keeps the review history
        // balanced. These are remote-only; losing one is fine.
        for right in results.correct_answers.iter().take(CORRECT_REVIEW_SAMPLES) {
            let entry = ReviewEntry {
                flash_card_id: right.flash_card_id,
                review_correct_answer: right.correct_answer.clone(),
                review_incorrect_answer: None,
                deck_id: session.deck_id,
                deck_title: session.deck_title.clone(),
                question_text: right.question.clone(),
            };
            writes.push(
                async move { self.api().add_review(self.user_id(), &entry).await }.boxed_local(),
            );
        }

        writes
    }
}

fn build_result_record(
    session: &QuizSession,
    results: &QuizResults,
    time_spent: u32,
) -> QuizResultRecord {
    let questions = session
        .questions
        .iter()
        .map(|q| ResultQuestion {
            question: q.question.clone(),
            question_type: q.question_type,
            correct_answer: q.correct_answer.clone(),
            user_answer: session.answer_for(q.id).unwrap_or_default().to_string(),
        })
        .collect();
    QuizResultRecord {
        deck_id: session.deck_id,
        title: session.deck_title.clone(),
        total_questions: session.questions.len(),
        correct_count: results.correct_count,
        incorrect_count: results.incorrect_count,
        time_spent,
        score: results.score,
        date: Utc::now(),
        questions,
    }
}
