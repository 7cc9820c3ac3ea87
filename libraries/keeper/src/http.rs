//! The backend is an opaque HTTP collaborator: requests either succeed (2xx)
//! or fail, and the app treats every failure the same way. This module is the
//! seam where a real `fetch` (see [`crate::browser`]) or a test double plugs in.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
        }
    }
}

#[derive(Clone, Debug)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub body: Option<serde_json::Value>,
    pub bearer_token: Option<String>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            body: None,
            bearer_token: None,
        }
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            body: None,
            bearer_token: None,
        }
    }

    pub fn put(url: impl Into<String>) -> Self {
        Self {
            method: Method::Put,
            url: url.into(),
            body: None,
            bearer_token: None,
        }
    }

    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn bearer(mut self, token: Option<String>) -> Self {
        self.bearer_token = token;
        self
    }
}

#[derive(Clone, Debug)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, HttpError> {
        serde_json::from_str(&self.body).map_err(|e| HttpError::InvalidBody(e.to_string()))
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum HttpError {
    /// The request never produced a response (DNS, offline, CORS, timeout).
    #[error("network error: {0}")]
    Network(String),
    #[error("unexpected response body: {0}")]
    InvalidBody(String),
}

/// Capability for reaching the remote collaborator. The returned response may
/// still be a non-2xx; callers decide what a failure status means.
#[allow(async_fn_in_trait)]
pub trait HttpClient {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError>;
}
