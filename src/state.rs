//! Root session state.
//!
//! `AppState` owns every store together with the identity provider and the
//! session persistence, and is handed by reference to whatever needs them.
//! Sign-in and logout go through it so the session user and the provider
//! user are always set and cleared together.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::config::ConfigV1;
use crate::error::ProviderError;
use crate::models::SessionUser;
use crate::persistence::SessionPersistence;
use crate::providers::{Credentials, IdentityProvider, SignInResult};
use crate::stores::{NavigationStore, ProfileStore, SessionStore, VisibleProfileClearPolicy};

/// Where the stores collectively stand. There is no "signing in" phase:
/// the stores only change once the provider has answered.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    Anonymous,
    Authenticated,
}

/// Outcome of a completed sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedIn {
    pub user: SessionUser,
    /// The page the user was on before being sent to sign in, consumed.
    pub redirect_to: Option<String>,
}

/// Read-only snapshot of the session, as reported by `find-users status`.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SessionStatus {
    pub phase: SessionPhase,
    pub user: Option<SessionUser>,
    pub token_key: String,
    pub has_token: bool,
    pub clear_policy: VisibleProfileClearPolicy,
    pub photo_url: Option<String>,
    /// A profile picture was picked but not uploaded yet.
    pub pending_picture: bool,
}

pub struct AppState {
    /// Application configuration loaded at startup.
    pub config: Arc<ConfigV1>,
    pub session: SessionStore,
    pub profile: ProfileStore,
    pub navigation: NavigationStore,
    provider: Arc<dyn IdentityProvider>,
    persistence: Arc<dyn SessionPersistence>,
}

impl AppState {
    pub fn new(
        config: Arc<ConfigV1>,
        provider: Arc<dyn IdentityProvider>,
        persistence: Arc<dyn SessionPersistence>,
    ) -> Self {
        let profile = ProfileStore::new(
            persistence.clone(),
            config.persistence.token_key.clone(),
            config.profile.clear_policy,
        );

        AppState {
            config,
            session: SessionStore::new(),
            profile,
            navigation: NavigationStore::new(),
            provider,
            persistence,
        }
    }

    pub fn provider(&self) -> &Arc<dyn IdentityProvider> {
        &self.provider
    }

    pub fn persistence(&self) -> &Arc<dyn SessionPersistence> {
        &self.persistence
    }

    pub fn phase(&self) -> SessionPhase {
        if self.session.is_authenticated() && self.profile.current_user().is_some() {
            SessionPhase::Authenticated
        } else {
            SessionPhase::Anonymous
        }
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            phase: self.phase(),
            user: self.session.user().cloned(),
            token_key: self.profile.token_key().to_string(),
            has_token: self.profile.token().is_some(),
            clear_policy: self.profile.clear_policy(),
            photo_url: self
                .profile
                .current_user()
                .and_then(|u| u.photo_url())
                .map(str::to_string),
            pending_picture: self
                .profile
                .visible_details()
                .is_some_and(|d| d.has_pending_picture()),
        }
    }

    /// Signs in through the configured provider and applies the result.
    ///
    /// The provider call is bounded by `auth.timeout_in_ms`. On any failure
    /// the stores are left exactly as they were.
    pub async fn sign_in(&mut self, credentials: &Credentials) -> Result<SignedIn, ProviderError> {
        let timeout_in_ms = self.config.auth.timeout_in_ms;
        let provider_name = self.provider.get_name().to_owned();
        debug!(
            provider_name = provider_name.as_str(),
            kind = credentials.kind(),
            "starting sign-in"
        );

        let result = match timeout(
            Duration::from_millis(timeout_in_ms),
            self.provider.sign_in(credentials),
        )
        .await
        {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                warn!(provider_name = provider_name.as_str(), error = %e, "sign-in failed");
                return Err(e);
            }
            Err(_) => {
                warn!(
                    provider_name = provider_name.as_str(),
                    timeout_in_ms, "sign-in timed out"
                );
                return Err(ProviderError::Timeout(timeout_in_ms));
            }
        };

        Ok(self.complete_sign_in(result))
    }

    /// Applies an already resolved sign-in: token, then provider user, then
    /// session user. The redirect target is consumed.
    pub fn complete_sign_in(&mut self, result: SignInResult) -> SignedIn {
        let SignInResult { token, user } = result;

        // A storage failure only costs reload survival; the session goes on.
        if let Err(e) = self.profile.set_token(Some(token)) {
            debug!(error = %e, "continuing with in-memory session token");
        }

        let session_user = SessionUser::from_provider_user(&user);
        self.profile.set_current_user(user);
        self.session.set_user(session_user.clone());

        let redirect_to = self.navigation.take_redirect_from();
        info!(
            user_id = session_user.id.as_str(),
            redirect = redirect_to.as_deref().unwrap_or("-"),
            "signed in"
        );

        SignedIn {
            user: session_user,
            redirect_to,
        }
    }

    /// Clears both users and the session token.
    pub fn logout(&mut self) {
        let user_id = self.session.user().map(|u| u.id.clone());

        self.session.logout();
        self.profile.clear_current_user();
        if let Err(e) = self.profile.clear_token() {
            debug!(error = %e, "persisted session token could not be removed");
        }

        info!(user_id = user_id.as_deref().unwrap_or("-"), "logged out");
    }

    /// Reloads a persisted session token into memory.
    ///
    /// This does not authenticate: the provider user must be fetched again
    /// with the returned token.
    pub fn restore(&mut self) -> Option<String> {
        match self.profile.restore_token() {
            Ok(token) => token.map(str::to_string),
            Err(e) => {
                warn!(error = %e, "could not read persisted session token");
                None
            }
        }
    }
}
