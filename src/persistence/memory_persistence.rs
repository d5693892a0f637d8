use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use super::SessionPersistence;
use crate::error::PersistenceError;

/// Key/value storage that lives as long as the process, the analogue of a
/// browser tab's session storage.
#[derive(Default)]
pub struct MemoryPersistence {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    fn items(&self) -> MutexGuard<'_, HashMap<String, String>> {
        // A panic while holding the lock cannot leave a half-written map.
        self.items.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl SessionPersistence for MemoryPersistence {
    fn get_item(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.items().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.items().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), PersistenceError> {
        self.items().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let persistence = MemoryPersistence::new();
        assert_eq!(persistence.get_item("find-users-Token").unwrap(), None);

        persistence.set_item("find-users-Token", "abc123").unwrap();
        assert_eq!(
            persistence.get_item("find-users-Token").unwrap().as_deref(),
            Some("abc123")
        );

        persistence.set_item("find-users-Token", "def456").unwrap();
        assert_eq!(
            persistence.get_item("find-users-Token").unwrap().as_deref(),
            Some("def456")
        );

        persistence.remove_item("find-users-Token").unwrap();
        assert_eq!(persistence.get_item("find-users-Token").unwrap(), None);
    }

    #[test]
    fn test_remove_missing_key_is_ok() {
        let persistence = MemoryPersistence::new();
        assert!(persistence.remove_item("nothing-here").is_ok());
    }
}
