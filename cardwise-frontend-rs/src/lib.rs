//! Core of the CardWise study app: quiz generation and grading, the staged
//! completion tally, best-effort dual-write persistence and the achievement
//! rules. The UI layer renders state and forwards events; everything that
//! decides something lives here.
//!
//! The crate is portable by construction. Browser concerns (storage, `fetch`,
//! timers) enter through the capability traits in [`keeper`], so the whole
//! core compiles and tests natively; the wasm glue only exists behind the
//! `browser` feature.

use std::cell::{Cell, RefCell};

pub mod achievements;
pub mod api;
pub mod completion;
pub mod model;
pub mod persistence;
pub mod questions;
pub mod results;
pub mod session;
pub mod study;
pub mod user;

#[cfg(test)]
mod test_support;

pub use achievements::{AchievementDef, QuizContext, StudyContext};
pub use api::{ApiError, CardWiseApi, RestApi};
pub use completion::{COMPLETE_HOLD_MS, CompleteQuizError, Route, TallyState, TallyStep};
pub use questions::DEFAULT_QUESTION_COUNT;
pub use session::{QuizSession, QuizTimer};
pub use study::StudySession;

/// The app's one long-lived object: the signed-in user plus the three
/// collaborators everything is written through. Views borrow it for the
/// duration of an operation.
///
/// `A` is the backend surface, `L` the persistent local store, `S` the
/// session-scoped store. Tests plug in doubles for all three.
pub struct CardWise<A, L, S> {
    api: A,
    local: L,
    session: S,
    user_id: String,
    tally: RefCell<TallyState>,
    tally_listener: RefCell<Option<Box<dyn Fn(&TallyState)>>>,
    achievement_notification: Cell<Option<AchievementDef>>,
}

impl<A, L, S> CardWise<A, L, S> {
    pub fn new(api: A, local: L, session: S, user_id: impl Into<String>) -> Self {
        Self {
            api,
            local,
            session,
            user_id: user_id.into(),
            tally: RefCell::new(TallyState::default()),
            tally_listener: RefCell::new(None),
            achievement_notification: Cell::new(None),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn local(&self) -> &L {
        &self.local
    }

    pub fn session_store(&self) -> &S {
        &self.session
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn tally_state(&self) -> TallyState {
        self.tally.borrow().clone()
    }

    /// The tally overlay registers here to re-render on every state change.
    /// The listener must not register another listener from inside the
    /// callback.
    pub fn set_tally_listener(&self, listener: impl Fn(&TallyState) + 'static) {
        *self.tally_listener.borrow_mut() = Some(Box::new(listener));
    }

    /// Mutate the tally state and notify the listener with the result. The
    /// state borrow is released before the listener runs, so the listener may
    /// read [`CardWise::tally_state`] freely.
    pub(crate) fn set_tally(&self, f: impl FnOnce(&mut TallyState)) {
        let snapshot = {
            let mut tally = self.tally.borrow_mut();
            f(&mut tally);
            tally.clone()
        };
        if let Some(listener) = self.tally_listener.borrow().as_ref() {
            listener(&snapshot);
        }
    }

    pub(crate) fn notify_achievement(&self, def: AchievementDef) {
        self.achievement_notification.set(Some(def));
    }

    /// The most recently unlocked achievement, if one is waiting to be shown.
    /// Taking it clears it; at most one toast is pending at a time.
    pub fn take_achievement_notification(&self) -> Option<AchievementDef> {
        self.achievement_notification.take()
    }
}

#[cfg(target_arch = "wasm32")]
#[cfg(feature = "browser")]
impl
    CardWise<
        RestApi<keeper::browser::FetchClient>,
        keeper::browser::BrowserStorage,
        keeper::browser::BrowserStorage,
    >
{
    /// Wire the client to real browser storage and `fetch`, picking up the
    /// auth session the login flow left in `localStorage`. `None` when
    /// signed out or storage is unavailable.
    pub fn from_browser(base_url: &str) -> Option<Self> {
        let local = keeper::browser::BrowserStorage::local()?;
        let session = keeper::browser::BrowserStorage::session()?;
        let token = user::load_token(&local)?;
        let user_id = user::load_user(&local)?.user_id()?.to_string();
        let api = RestApi::new(keeper::browser::FetchClient, base_url, Some(token));
        Some(Self::new(api, local, session, user_id))
    }
}
