use std::sync::Arc;

use tracing::info;

use super::{file_persistence::FilePersistence, memory_persistence::MemoryPersistence, no_persistence::NoPersistence};
use crate::config::{PersistenceBackend, PersistenceConfig};
use crate::error::PersistenceError;

/// Session-scoped key/value storage the session token is mirrored into.
///
/// Calls are synchronous: stores never suspend, so neither may their storage.
pub trait SessionPersistence: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, PersistenceError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), PersistenceError>;
    fn remove_item(&self, key: &str) -> Result<(), PersistenceError>;
    fn is_enabled(&self) -> bool {
        // Real backends are always enabled; NoPersistence overrides this
        // so callers can skip it without logging a failure.
        true
    }
}

/// Creates a concrete persistence backend from the PersistenceConfig.
/// If `persistence.enabled = false`, returns NoPersistence.
pub fn create_persistence(
    config: &PersistenceConfig,
) -> Result<Arc<dyn SessionPersistence>, PersistenceError> {
    if !config.enabled {
        info!("Session persistence is disabled. Using NoPersistence.");
        return Ok(Arc::new(NoPersistence::new()));
    }

    match &config.backend {
        Some(PersistenceBackend::File(file_config)) => {
            let persistence = FilePersistence::new(file_config)?;
            info!(
                path = %file_config.path.display(),
                "Using file-backed session persistence."
            );
            Ok(Arc::new(persistence))
        }
        Some(PersistenceBackend::Memory) | None => {
            info!("Using in-memory session persistence.");
            Ok(Arc::new(MemoryPersistence::new()))
        }
    }
}
