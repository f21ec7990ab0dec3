// PreferenceStore backed by a single JSON object on disk.
//
// The whole map is rewritten on every change through a sibling temp file and a
// rename, so a crash leaves either the old or the new file. A missing file reads
// as empty. A file that does not parse is moved aside to `<name>.corrupt` and
// the store starts empty.

use crate::shared::infrastructure::preferences::{PreferenceError, PreferenceStore};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

pub struct JsonFilePreferenceStore {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}

impl JsonFilePreferenceStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, PreferenceError> {
        let path = path.into();
        let values = match fs::read(&path) {
            Ok(bytes) if bytes.is_empty() => BTreeMap::new(),
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(values) => values,
                Err(err) => {
                    let aside = with_suffix(&path, ".corrupt");
                    tracing::warn!(
                        path = %path.display(),
                        moved_to = %aside.display(),
                        error = %err,
                        "unreadable preferences, starting with defaults"
                    );
                    fs::rename(&path, &aside)?;
                    BTreeMap::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(err.into()),
        };
        tracing::debug!(path = %path.display(), keys = values.len(), "preferences loaded");
        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, values: &BTreeMap<String, String>) -> Result<(), PreferenceError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let staged = with_suffix(&self.path, ".tmp");
        fs::write(&staged, serde_json::to_vec_pretty(values)?)?;
        fs::rename(&staged, &self.path)?;
        Ok(())
    }
}

impl PreferenceStore for JsonFilePreferenceStore {
    fn load(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        Ok(self
            .values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned())
    }

    // A failed write puts the previous value back so memory matches the disk.
    fn save(&self, key: &str, value: &str) -> Result<(), PreferenceError> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        let previous = values.insert(key.to_string(), value.to_string());
        self.persist(&values).inspect_err(|_| match previous {
            Some(previous) => {
                values.insert(key.to_string(), previous);
            }
            None => {
                values.remove(key);
            }
        })
    }

    fn remove(&self, key: &str) -> Result<(), PreferenceError> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = values.remove(key) {
            self.persist(&values).inspect_err(|_| {
                values.insert(key.to_string(), previous);
            })?;
        }
        Ok(())
    }
}
