use std::cell::RefCell;
use std::collections::HashMap;

use serde::Serialize;
use serde::de::DeserializeOwned;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing store refused the write (quota, privacy mode, ...).
    #[error("storage write failed: {0}")]
    Write(String),
    #[error("could not serialize record: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// String-keyed, string-valued storage capability. Browser `localStorage` and
/// `sessionStorage` have this exact shape; tests use [`MemoryStore`].
///
/// Methods take `&self` — implementations use interior mutability, since the
/// store is shared by many concurrently-settling writes. We never hold a
/// borrow of a store across an `.await`; every read-modify-write completes
/// synchronously.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str);
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) {
        self.entries.borrow_mut().remove(key);
    }
}

/// Read a JSON list from the store. A missing key yields an empty list; so
/// does a corrupt one (logged and discarded rather than wedging every future
/// append on one bad record).
pub fn read_list<T: DeserializeOwned>(store: &impl KeyValueStore, key: &str) -> Vec<T> {
    let Some(raw) = store.get(key) else {
        return Vec::new();
    };
    match serde_json::from_str(&raw) {
        Ok(list) => list,
        Err(e) => {
            log::warn!("Discarding corrupt list at {key}: {e}");
            Vec::new()
        }
    }
}

pub fn write_list<T: Serialize>(
    store: &impl KeyValueStore,
    key: &str,
    list: &[T],
) -> Result<(), StoreError> {
    let raw = serde_json::to_string(list)?;
    store.set(key, &raw)
}

/// Append one record to the end of the JSON list at `key`.
pub fn push_back<T: Serialize + DeserializeOwned>(
    store: &impl KeyValueStore,
    key: &str,
    record: T,
) -> Result<(), StoreError> {
    let mut list: Vec<serde_json::Value> = read_list(store, key);
    list.push(serde_json::to_value(record)?);
    write_list(store, key, &list)
}

/// Append one record to the front of the JSON list at `key` (newest first).
pub fn push_front<T: Serialize + DeserializeOwned>(
    store: &impl KeyValueStore,
    key: &str,
    record: T,
) -> Result<(), StoreError> {
    let mut list: Vec<serde_json::Value> = read_list(store, key);
    list.insert(0, serde_json::to_value(record)?);
    write_list(store, key, &list)
}
