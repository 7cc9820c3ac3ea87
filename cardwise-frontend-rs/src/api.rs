//! Typed surface over the remote HTTP collaborator. The backend is an opaque
//! black box: every operation either succeeds or fails, and callers in
//! `persistence.rs` decide which failures fall back to local storage.

use keeper::{HttpClient, HttpError, HttpRequest, HttpResponse};
use serde_json::json;

use crate::model::{Achievement, Deck, Flashcard, ProgressEntry, ReviewEntry};

#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Http(#[from] HttpError),
    #[error("backend returned HTTP {status}")]
    Status { status: u16 },
}

#[allow(async_fn_in_trait)]
pub trait CardWiseApi {
    async fn complete_quiz(&self, user_id: &str, deck_id: i64, score: u8) -> Result<(), ApiError>;
    async fn add_progress(&self, user_id: &str, entry: &ProgressEntry) -> Result<(), ApiError>;
    async fn add_review(&self, user_id: &str, entry: &ReviewEntry) -> Result<(), ApiError>;
    async fn track_study_time(&self, user_id: &str, minutes: u32) -> Result<(), ApiError>;
    async fn achievements_for_user(&self, user_id: &str) -> Result<Vec<Achievement>, ApiError>;
    async fn unlock_achievement(
        &self,
        user_id: &str,
        title: &str,
        description: &str,
    ) -> Result<(), ApiError>;
    async fn decks_for_user(&self, user_id: &str) -> Result<Vec<Deck>, ApiError>;
    async fn update_flashcard(&self, card: &Flashcard) -> Result<(), ApiError>;
}

/// The real backend, reached over whatever [`HttpClient`] the host provides
/// (browser `fetch` in production, a double in tests).
pub struct RestApi<C> {
    client: C,
    base_url: String,
    token: Option<String>,
}

impl<C: HttpClient> RestApi<C> {
    pub fn new(client: C, base_url: impl Into<String>, token: Option<String>) -> Self {
        let base_url = base_url.into();
        let base_url = base_url.trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            token,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let request = request.bearer(self.token.clone());
        let response = self.client.send(request).await?;
        if !response.is_success() {
            return Err(ApiError::Status {
                status: response.status,
            });
        }
        Ok(response)
    }
}

impl<C: HttpClient> CardWiseApi for RestApi<C> {
    async fn complete_quiz(&self, user_id: &str, deck_id: i64, score: u8) -> Result<(), ApiError> {
        let url = self.url(&format!(
            "/quiz/complete?userId={user_id}&deckId={deck_id}&score={score}"
        ));
        self.send(HttpRequest::post(url)).await?;
        Ok(())
    }

    async fn add_progress(&self, user_id: &str, entry: &ProgressEntry) -> Result<(), ApiError> {
        let url = self.url(&format!("/progress/add?userId={user_id}"));
        self.send(HttpRequest::post(url).json(json!(entry))).await?;
        Ok(())
    }

    async fn add_review(&self, user_id: &str, entry: &ReviewEntry) -> Result<(), ApiError> {
        let url = self.url(&format!("/review/add?userId={user_id}"));
        self.send(HttpRequest::post(url).json(json!(entry))).await?;
        Ok(())
    }

    async fn track_study_time(&self, user_id: &str, minutes: u32) -> Result<(), ApiError> {
        let url = self.url(&format!(
            "/progress/trackStudyTime?userId={user_id}&minutesSpent={minutes}"
        ));
        self.send(HttpRequest::post(url)).await?;
        Ok(())
    }

    async fn achievements_for_user(&self, user_id: &str) -> Result<Vec<Achievement>, ApiError> {
        let url = self.url(&format!("/achievements/user/{user_id}"));
        let response = self.send(HttpRequest::get(url)).await?;
        Ok(response.json()?)
    }

    async fn unlock_achievement(
        &self,
        user_id: &str,
        title: &str,
        description: &str,
    ) -> Result<(), ApiError> {
        let url = self.url(&format!(
            "/achievements/unlock?userId={user_id}&title={}&description={}",
            urlencoding::encode(title),
            urlencoding::encode(description),
        ));
        self.send(HttpRequest::post(url)).await?;
        Ok(())
    }

    async fn decks_for_user(&self, user_id: &str) -> Result<Vec<Deck>, ApiError> {
        let url = self.url(&format!("/deck/getByUserId/{user_id}"));
        let response = self.send(HttpRequest::get(url)).await?;
        Ok(response.json()?)
    }

    async fn update_flashcard(&self, card: &Flashcard) -> Result<(), ApiError> {
        let url = self.url(&format!("/flashcard/updateFlashcard/{}", card.id));
        self.send(HttpRequest::put(url).json(json!(card))).await?;
        Ok(())
    }
}
