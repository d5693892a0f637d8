use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::PersistenceError;
use crate::models::{ProviderUser, VisibleProfile};
use crate::persistence::SessionPersistence;

/// Whether clearing the provider user also drops the visible profile.
#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VisibleProfileClearPolicy {
    /// The visible profile survives `clear_current_user`.
    #[default]
    Keep,
    /// `clear_current_user` clears the visible profile too.
    Clear,
}

/// Holds the provider user record, the session token and the editable
/// visible profile.
///
/// The token is mirrored into session persistence under a fixed key so it
/// survives reloads. Every setter is last-write-wins.
pub struct ProfileStore {
    token: Option<String>,
    current_user: Option<ProviderUser>,
    visible_details: Option<VisibleProfile>,
    persistence: Arc<dyn SessionPersistence>,
    token_key: String,
    clear_policy: VisibleProfileClearPolicy,
}

impl ProfileStore {
    pub fn new(
        persistence: Arc<dyn SessionPersistence>,
        token_key: impl Into<String>,
        clear_policy: VisibleProfileClearPolicy,
    ) -> Self {
        Self {
            token: None,
            current_user: None,
            visible_details: None,
            persistence,
            token_key: token_key.into(),
            clear_policy,
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn token_key(&self) -> &str {
        &self.token_key
    }

    pub fn current_user(&self) -> Option<&ProviderUser> {
        self.current_user.as_ref()
    }

    pub fn visible_details(&self) -> Option<&VisibleProfile> {
        self.visible_details.as_ref()
    }

    pub fn clear_policy(&self) -> VisibleProfileClearPolicy {
        self.clear_policy
    }

    /// Stores the token in memory and, when present, mirrors it into persistence.
    ///
    /// `None` and an empty token are kept in memory as given but never reach
    /// storage, so the stored entry is left alone (use `clear_token` for that).
    /// A failed storage write is returned to the caller but the in-memory
    /// token stays set.
    pub fn set_token(&mut self, token: Option<String>) -> Result<(), PersistenceError> {
        self.token = token;

        let Some(token) = self.token.as_deref().filter(|t| !t.is_empty()) else {
            debug!("no session token to persist; persisted entry untouched");
            return Ok(());
        };

        if !self.persistence.is_enabled() {
            debug!("session persistence disabled; token kept in memory only");
            return Ok(());
        }

        self.persistence
            .set_item(&self.token_key, token)
            .inspect_err(|e| {
                warn!(
                    token_key = self.token_key.as_str(),
                    error = %e,
                    "failed to persist session token"
                )
            })
    }

    /// Clears the in-memory token and removes the persisted entry.
    pub fn clear_token(&mut self) -> Result<(), PersistenceError> {
        self.token = None;

        if !self.persistence.is_enabled() {
            return Ok(());
        }

        self.persistence
            .remove_item(&self.token_key)
            .inspect_err(|e| {
                warn!(
                    token_key = self.token_key.as_str(),
                    error = %e,
                    "failed to remove persisted session token"
                )
            })
    }

    /// Loads a previously persisted token into memory, e.g. after a reload.
    ///
    /// Returns the restored token. An empty persistence leaves the in-memory
    /// token unchanged.
    pub fn restore_token(&mut self) -> Result<Option<&str>, PersistenceError> {
        if !self.persistence.is_enabled() {
            return Ok(None);
        }

        match self.persistence.get_item(&self.token_key)? {
            Some(token) => {
                debug!(token_key = self.token_key.as_str(), "session token restored");
                self.token = Some(token);
                Ok(self.token.as_deref())
            }
            None => Ok(None),
        }
    }

    /// Replaces the provider user record wholesale.
    pub fn set_current_user(&mut self, user: ProviderUser) {
        debug!(uid = user.uid.as_str(), "provider user set");
        self.current_user = Some(user);
    }

    /// Replaces the visible profile wholesale.
    pub fn set_visible_details(&mut self, details: VisibleProfile) {
        self.visible_details = Some(details);
    }

    /// Drops the provider user. The visible profile follows the clear policy.
    pub fn clear_current_user(&mut self) {
        self.current_user = None;
        if self.clear_policy == VisibleProfileClearPolicy::Clear {
            self.visible_details = None;
        }
    }
}
