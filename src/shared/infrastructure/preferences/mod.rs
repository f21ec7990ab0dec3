// Persisted browser-side preferences.
//
// Purpose
// - Keep the handful of small values that survive a reload: tokens, the pending
//   draft pointer, hidden calendar users, visible table columns, theme.
//
// Responsibilities
// - PreferenceStore is the raw key/value port. Values are strings, JSON for
//   anything that is not a scalar.
// - Preferences offers typed accessors so call sites never parse strings.
//
// Every value is last-write-wins. There is no schema versioning: a value that
// does not parse is treated as absent and logged.

pub mod in_memory;
pub mod json_file;

use crate::shared::core::primitives::{RecordId, UserId};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use thiserror::Error;

pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
pub const PENDING_DRAFT_KEY: &str = "pending_draft_id";
pub const HIDDEN_USERS_KEY: &str = "calendar_hidden_users";
pub const VISIBLE_COLUMNS_KEY: &str = "clients_visible_columns";
pub const THEME_KEY: &str = "theme";

#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error("preference store io: {0}")]
    Io(#[from] std::io::Error),

    #[error("preference encoding: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("preference store offline")]
    Offline,
}

pub trait PreferenceStore: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<String>, PreferenceError>;
    fn save(&self, key: &str, value: &str) -> Result<(), PreferenceError>;
    fn remove(&self, key: &str) -> Result<(), PreferenceError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

#[derive(Clone)]
pub struct Preferences {
    store: Arc<dyn PreferenceStore>,
}

impl Preferences {
    pub fn new(store: Arc<dyn PreferenceStore>) -> Self {
        Self { store }
    }

    pub fn access_token(&self) -> Option<String> {
        self.read_raw(ACCESS_TOKEN_KEY)
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.read_raw(REFRESH_TOKEN_KEY)
    }

    pub fn store_tokens(&self, access: &str, refresh: &str) -> Result<(), PreferenceError> {
        self.store.save(ACCESS_TOKEN_KEY, access)?;
        self.store.save(REFRESH_TOKEN_KEY, refresh)
    }

    pub fn set_access_token(&self, access: &str) -> Result<(), PreferenceError> {
        self.store.save(ACCESS_TOKEN_KEY, access)
    }

    pub fn clear_tokens(&self) -> Result<(), PreferenceError> {
        self.store.remove(ACCESS_TOKEN_KEY)?;
        self.store.remove(REFRESH_TOKEN_KEY)
    }

    pub fn pending_draft_id(&self) -> Option<RecordId> {
        self.read_json(PENDING_DRAFT_KEY)
    }

    pub fn set_pending_draft_id(&self, id: RecordId) -> Result<(), PreferenceError> {
        self.write_json(PENDING_DRAFT_KEY, &id)
    }

    pub fn clear_pending_draft_id(&self) -> Result<(), PreferenceError> {
        self.store.remove(PENDING_DRAFT_KEY)
    }

    pub fn hidden_users(&self) -> Vec<UserId> {
        self.read_json(HIDDEN_USERS_KEY).unwrap_or_default()
    }

    /// Hides a visible user or shows a hidden one; returns the new hidden list.
    pub fn toggle_hidden_user(&self, user_id: UserId) -> Result<Vec<UserId>, PreferenceError> {
        let mut hidden = self.hidden_users();
        if let Some(position) = hidden.iter().position(|id| *id == user_id) {
            hidden.remove(position);
        } else {
            hidden.push(user_id);
        }
        self.write_json(HIDDEN_USERS_KEY, &hidden)?;
        Ok(hidden)
    }

    pub fn show_all_users(&self) -> Result<(), PreferenceError> {
        self.write_json(HIDDEN_USERS_KEY, &Vec::<UserId>::new())
    }

    /// None means the user never chose, and the view shows its default columns.
    pub fn visible_columns(&self) -> Option<Vec<String>> {
        self.read_json(VISIBLE_COLUMNS_KEY)
    }

    pub fn set_visible_columns(&self, columns: &[String]) -> Result<(), PreferenceError> {
        self.write_json(VISIBLE_COLUMNS_KEY, &columns)
    }

    pub fn theme(&self) -> Theme {
        match self.read_raw(THEME_KEY).as_deref() {
            Some("dark") => Theme::Dark,
            _ => Theme::Light,
        }
    }

    pub fn toggle_theme(&self) -> Result<Theme, PreferenceError> {
        let next = self.theme().toggled();
        self.store.save(THEME_KEY, next.as_str())?;
        Ok(next)
    }

    fn read_raw(&self, key: &str) -> Option<String> {
        match self.store.load(key) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(key, error = %err, "preference read failed");
                None
            }
        }
    }

    fn read_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.read_raw(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!(key, error = %err, "ignoring unreadable preference");
                None
            }
        }
    }

    fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), PreferenceError> {
        let raw = serde_json::to_string(value)?;
        self.store.save(key, &raw)
    }
}
