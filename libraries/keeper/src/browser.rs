//! Browser-backed implementations of the capability traits. Only compiled for
//! wasm with the `browser` feature, the same way the sync targets are gated in
//! similar engines; native builds (and tests) use in-memory doubles instead.

use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen::closure::Closure;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response};

use crate::http::{HttpClient, HttpError, HttpRequest, HttpResponse};
use crate::store::{KeyValueStore, StoreError};

fn window() -> Result<web_sys::Window, HttpError> {
    web_sys::window().ok_or_else(|| HttpError::Network("no window in this environment".into()))
}

fn js_err(value: JsValue) -> String {
    value
        .as_string()
        .unwrap_or_else(|| format!("{value:?}"))
}

/// `localStorage` or `sessionStorage` behind the [`KeyValueStore`] capability.
pub struct BrowserStorage {
    storage: web_sys::Storage,
}

impl BrowserStorage {
    /// Persists across sessions until explicitly cleared.
    pub fn local() -> Option<Self> {
        let storage = web_sys::window()?.local_storage().ok()??;
        Some(Self { storage })
    }

    /// Cleared when the browsing session ends.
    pub fn session() -> Option<Self> {
        let storage = web_sys::window()?.session_storage().ok()??;
        Some(Self { storage })
    }
}

impl KeyValueStore for BrowserStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.get_item(key).ok()?
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.storage
            .set_item(key, value)
            .map_err(|e| StoreError::Write(js_err(e)))
    }

    fn remove(&self, key: &str) {
        let _ = self.storage.remove_item(key);
    }
}

/// `fetch`-backed [`HttpClient`].
pub struct FetchClient;

impl HttpClient for FetchClient {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        let opts = RequestInit::new();
        opts.set_method(request.method.as_str());
        opts.set_mode(RequestMode::Cors);
        if let Some(body) = &request.body {
            let json = serde_json::to_string(body)
                .map_err(|e| HttpError::InvalidBody(e.to_string()))?;
            opts.set_body(&JsValue::from_str(&json));
        }

        let fetch_request = Request::new_with_str_and_init(&request.url, &opts)
            .map_err(|e| HttpError::Network(js_err(e)))?;
        if request.body.is_some() {
            fetch_request
                .headers()
                .set("Content-Type", "application/json")
                .map_err(|e| HttpError::Network(js_err(e)))?;
        }
        if let Some(token) = &request.bearer_token {
            fetch_request
                .headers()
                .set("Authorization", &format!("Bearer {token}"))
                .map_err(|e| HttpError::Network(js_err(e)))?;
        }

        let response = JsFuture::from(window()?.fetch_with_request(&fetch_request))
            .await
            .map_err(|e| HttpError::Network(js_err(e)))?;
        let response: Response = response
            .dyn_into()
            .map_err(|_| HttpError::Network("fetch did not return a Response".into()))?;

        let text = JsFuture::from(
            response
                .text()
                .map_err(|e| HttpError::Network(js_err(e)))?,
        )
        .await
        .map_err(|e| HttpError::Network(js_err(e)))?;

        Ok(HttpResponse {
            status: response.status(),
            body: text.as_string().unwrap_or_default(),
        })
    }
}

/// Resolves after `ms` milliseconds. Used for the cosmetic hold at the end of
/// the quiz tally.
pub async fn timeout(ms: i32) {
    let promise = js_sys::Promise::new(&mut |resolve, _reject| {
        if let Some(window) = web_sys::window() {
            let _ = window
                .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms);
        }
    });
    let _ = JsFuture::from(promise).await;
}

/// A repeating callback that is *cancelled* (not merely ignored) when dropped.
/// The quiz timer's one-second tick runs on one of these; dropping the session
/// clears the browser interval so nothing outlives it.
pub struct Interval {
    handle: i32,
    // kept alive for as long as the interval may fire
    _callback: Closure<dyn FnMut()>,
}

impl Interval {
    pub fn new(ms: i32, f: impl FnMut() + 'static) -> Option<Self> {
        let callback = Closure::new(f);
        let handle = web_sys::window()?
            .set_interval_with_callback_and_timeout_and_arguments_0(
                callback.as_ref().unchecked_ref(),
                ms,
            )
            .ok()?;
        Some(Self {
            handle,
            _callback: callback,
        })
    }
}

impl Drop for Interval {
    fn drop(&mut self) {
        if let Some(window) = web_sys::window() {
            window.clear_interval_with_handle(self.handle);
        }
    }
}
