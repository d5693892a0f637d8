//! Builds the root session state from configuration.
//!
//! This is where the concrete persistence backend and identity provider are
//! chosen; everything downstream only sees the traits.

use std::sync::Arc;
use tracing::info;

use crate::config::ConfigV1;
use crate::error::PersistenceError;
use crate::persistence::create_persistence;
use crate::providers::create_identity_provider;
use crate::state::AppState;

/// Creates the persistence backend and identity provider named in `config`
/// and wires them into a fresh `AppState`.
///
/// # Errors
///
/// Returns an error if the persistence backend cannot be initialized
/// (for example, an unwritable directory for the file backend).
pub fn build_state(config: Arc<ConfigV1>) -> Result<AppState, PersistenceError> {
    let persistence = create_persistence(&config.persistence)?;
    let provider = create_identity_provider(&config.provider);

    info!(
        provider_name = provider.get_name(),
        provider_type = provider.get_type(),
        persistence_enabled = persistence.is_enabled(),
        clear_policy = ?config.profile.clear_policy,
        "session state initialized"
    );

    Ok(AppState::new(config, provider, persistence))
}
