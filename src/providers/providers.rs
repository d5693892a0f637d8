use std::fmt;
use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{
    firebase_provider::{FirebaseProvider, FirebaseProviderConfig},
    plain_provider::{PlainProvider, PlainProviderConfig},
};
use crate::error::ProviderError;
use crate::models::ProviderUser;

/// Configuration for the identity provider the application signs in against.
#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone)]
#[serde(tag = "type")]
pub enum ProviderConfig {
    #[serde(rename = "firebase")]
    Firebase(FirebaseProviderConfig),
    #[serde(rename = "plain")]
    Plain(PlainProviderConfig),
}

/// What the user typed (or chose) on the sign-in page.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    EmailPassword { email: String, password: String },
    Anonymous,
}

impl Credentials {
    pub fn email_password(email: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials::EmailPassword {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Short label used in logs and errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Credentials::EmailPassword { .. } => "email/password",
            Credentials::Anonymous => "anonymous",
        }
    }
}

// Passwords must never end up in logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::EmailPassword { email, .. } => f
                .debug_struct("EmailPassword")
                .field("email", email)
                .field("password", &"<redacted>")
                .finish(),
            Credentials::Anonymous => f.write_str("Anonymous"),
        }
    }
}

/// A successful sign-in: the session token plus the provider's user record.
#[derive(Debug, Clone)]
pub struct SignInResult {
    pub token: String,
    pub user: ProviderUser,
}

/// An identity provider must be able to turn credentials into a signed-in user or an error.
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    fn get_name(&self) -> &str;
    fn get_type(&self) -> &str;
    async fn sign_in(&self, credentials: &Credentials) -> Result<SignInResult, ProviderError>;
}

/// Create an identity provider from a given config.
pub fn create_identity_provider(config: &ProviderConfig) -> Arc<dyn IdentityProvider> {
    match config {
        ProviderConfig::Firebase(cfg) => Arc::new(FirebaseProvider::new(cfg)),
        ProviderConfig::Plain(cfg) => Arc::new(PlainProvider::new(cfg)),
    }
}
