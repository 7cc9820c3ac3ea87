//! Read-only view of the signed-in user, as left in local storage by the
//! login flow.

use serde::{Deserialize, Serialize};

use keeper::{KeyValueStore, StoreError};

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";

/// The stored user object. Older records carry the id under `userId`, newer
/// ones under `id`; [`CurrentUser::user_id`] accepts either.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl CurrentUser {
    pub fn user_id(&self) -> Option<i64> {
        self.id.or(self.user_id)
    }
}

pub fn load_token(store: &impl KeyValueStore) -> Option<String> {
    store.get(TOKEN_KEY)
}

pub fn load_user(store: &impl KeyValueStore) -> Option<CurrentUser> {
    let raw = store.get(USER_KEY)?;
    match serde_json::from_str(&raw) {
        Ok(user) => Some(user),
        Err(e) => {
            log::warn!("Discarding corrupt stored user: {e}");
            None
        }
    }
}

pub fn save_session(
    store: &impl KeyValueStore,
    token: &str,
    user: &CurrentUser,
) -> Result<(), StoreError> {
    store.set(TOKEN_KEY, token)?;
    store.set(USER_KEY, &serde_json::to_string(user)?)
}

pub fn clear_session(store: &impl KeyValueStore) {
    store.remove(TOKEN_KEY);
    store.remove(USER_KEY);
}

/// Signed in means both the token and a parseable user with an id are
/// present.
pub fn is_authenticated(store: &impl KeyValueStore) -> bool {
    load_token(store).is_some() && load_user(store).is_some_and(|u| u.user_id().is_some())
}
