// In memory implementation of the PreferenceStore port.
//
// Purpose
// - Back tests and short-lived sessions that must not touch the disk.

use crate::shared::infrastructure::preferences::{PreferenceError, PreferenceStore};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

#[derive(Default)]
pub struct InMemoryPreferenceStore {
    values: RwLock<HashMap<String, String>>,
    is_offline: bool,
}

impl InMemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle_offline(&mut self) {
        self.is_offline = !self.is_offline;
    }

    pub fn len(&self) -> usize {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PreferenceStore for InMemoryPreferenceStore {
    fn load(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        if self.is_offline {
            return Err(PreferenceError::Offline);
        }
        Ok(self
            .values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), PreferenceError> {
        if self.is_offline {
            return Err(PreferenceError::Offline);
        }
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PreferenceError> {
        if self.is_offline {
            return Err(PreferenceError::Offline);
        }
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}
