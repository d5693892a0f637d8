use super::SessionPersistence;
use crate::error::PersistenceError;

/// A no-op persistence that always returns an error if called,
/// indicating persistence is disabled.
pub struct NoPersistence;

impl NoPersistence {
    pub fn new() -> Self {
        NoPersistence
    }
}

impl Default for NoPersistence {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionPersistence for NoPersistence {
    fn get_item(&self, _key: &str) -> Result<Option<String>, PersistenceError> {
        Err(PersistenceError::Disabled)
    }

    fn set_item(&self, _key: &str, _value: &str) -> Result<(), PersistenceError> {
        Err(PersistenceError::Disabled)
    }

    fn remove_item(&self, _key: &str) -> Result<(), PersistenceError> {
        Err(PersistenceError::Disabled)
    }

    fn is_enabled(&self) -> bool {
        false
    }
}
