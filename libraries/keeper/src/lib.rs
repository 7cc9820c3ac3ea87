//! This is a library for best-effort persistence in browser apps.
//! It was created for CardWise, so it doesn't include much that was not needed for that project.
//!
//! Persistence strategy:
//! 1. The app talks to its backend through the [`HttpClient`] capability and keeps
//!    per-user fallback records in a [`KeyValueStore`] (localStorage in the browser).
//! 2. Writes go to the backend first. A write that fails for any reason (network,
//!    non-2xx) is appended to a JSON list in the key-value store instead, and the
//!    failure is not surfaced to the caller.
//! 3. Fan-outs of independent writes are joined with [`settle_all`], so one failed
//!    write never blocks or fails its siblings.
//!
//! Nothing here is CardWise-specific; the domain crate decides keys, payloads and
//! which failures are fatal.

pub mod http;
pub mod settle;
pub mod store;

#[cfg(target_arch = "wasm32")]
#[cfg(feature = "browser")]
pub mod browser;

pub use http::{HttpClient, HttpError, HttpRequest, HttpResponse, Method};
pub use settle::settle_all;
pub use store::{KeyValueStore, MemoryStore, StoreError};
