use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::SessionPersistence;
use crate::error::PersistenceError;

/// The config struct for file-backed persistence.
#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone)]
pub struct FilePersistenceConfig {
    /// JSON file holding a flat `{ key: value }` object.
    pub path: PathBuf,
}

/// Persists items as one JSON object on disk so a session survives restarts.
///
/// Every write replaces the file through a temporary sibling and a rename,
/// so a reader never sees a partially written object.
pub struct FilePersistence {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FilePersistence {
    /// Creates the parent directory if needed. The file itself is created on first write.
    pub fn new(config: &FilePersistenceConfig) -> Result<Self, PersistenceError> {
        if let Some(parent) = config.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        Ok(Self {
            path: config.path.clone(),
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_items(&self) -> Result<BTreeMap<String, String>, PersistenceError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_items(&self, items: &BTreeMap<String, String>) -> Result<(), PersistenceError> {
        let raw = serde_json::to_string_pretty(items)?;
        let tmp = self
            .path
            .with_extension(format!("tmp-{}", uuid::Uuid::new_v4()));

        fs::write(&tmp, raw)?;
        if let Err(e) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }

    fn update<F>(&self, apply: F) -> Result<(), PersistenceError>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut items = self.read_items()?;
        apply(&mut items);
        self.write_items(&items)
    }
}

impl SessionPersistence for FilePersistence {
    fn get_item(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.read_items()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        debug!(path = %self.path.display(), key, "writing session item");
        self.update(|items| {
            items.insert(key.to_string(), value.to_string());
        })
    }

    fn remove_item(&self, key: &str) -> Result<(), PersistenceError> {
        debug!(path = %self.path.display(), key, "removing session item");
        self.update(|items| {
            items.remove(key);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("find-users-test-{}", uuid::Uuid::new_v4()))
            .join(name)
    }

    #[test]
    fn test_round_trip_survives_new_instance() {
        let config = FilePersistenceConfig {
            path: temp_path("session.json"),
        };

        let first = FilePersistence::new(&config).unwrap();
        assert_eq!(first.get_item("find-users-Token").unwrap(), None);
        first.set_item("find-users-Token", "abc123").unwrap();
        first.set_item("other", "x").unwrap();

        // A fresh instance on the same path sees what the first one wrote.
        let second = FilePersistence::new(&config).unwrap();
        assert_eq!(
            second.get_item("find-users-Token").unwrap().as_deref(),
            Some("abc123")
        );

        second.remove_item("find-users-Token").unwrap();
        assert_eq!(first.get_item("find-users-Token").unwrap(), None);
        assert_eq!(first.get_item("other").unwrap().as_deref(), Some("x"));

        let _ = fs::remove_dir_all(config.path.parent().unwrap());
    }

    #[test]
    fn test_corrupt_file_reports_serialization_error() {
        let config = FilePersistenceConfig {
            path: temp_path("session.json"),
        };
        let persistence = FilePersistence::new(&config).unwrap();
        fs::write(persistence.path(), "not json").unwrap();

        assert!(matches!(
            persistence.get_item("find-users-Token"),
            Err(PersistenceError::Serialization(_))
        ));
        assert!(persistence.set_item("find-users-Token", "abc").is_err());

        let _ = fs::remove_dir_all(config.path.parent().unwrap());
    }
}
