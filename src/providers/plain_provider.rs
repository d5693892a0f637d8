use async_trait::async_trait;
use chrono::{Duration, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ProviderError;
use crate::models::{ProviderIdentity, ProviderUser, TokenInfo};
use crate::providers::{Credentials, IdentityProvider, SignInResult};

const PLAIN_TOKEN_LIFETIME_SECS: i64 = 3600;

/// PlainProviderConfig lists the accounts a `PlainProvider` accepts.
#[derive(Deserialize, Serialize, Debug, JsonSchema, Clone)]
pub struct PlainProviderConfig {
    /// A friendly name for logs.
    pub name: String,
    /// A list of email/password accounts.
    pub users: Vec<PlainUserEntry>,
    #[serde(default)]
    pub allow_anonymous: bool,
}

/// Represents a single account entry.
#[derive(Deserialize, Serialize, Debug, JsonSchema, Clone)]
pub struct PlainUserEntry {
    pub uid: String,
    pub email: String,
    pub password: String,
    pub display_name: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
}

/// An offline provider that checks credentials against the configured
/// account list and issues random session tokens.
pub struct PlainProvider {
    pub config: PlainProviderConfig,
}

impl PlainProvider {
    pub fn new(config: &PlainProviderConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    fn issue(&self, user: ProviderUser) -> SignInResult {
        let now = Utc::now();
        let token = uuid::Uuid::new_v4().to_string();
        let user = ProviderUser {
            token_info: Some(TokenInfo {
                refresh_token: uuid::Uuid::new_v4().to_string(),
                access_token: token.clone(),
                expiration_time: (now + Duration::seconds(PLAIN_TOKEN_LIFETIME_SECS))
                    .timestamp_millis(),
            }),
            last_login_at: Some(now),
            ..user
        };
        SignInResult { token, user }
    }
}

#[async_trait]
impl IdentityProvider for PlainProvider {
    fn get_name(&self) -> &str {
        &self.config.name
    }

    fn get_type(&self) -> &str {
        "plain"
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<SignInResult, ProviderError> {
        match credentials {
            Credentials::EmailPassword { email, password } => {
                debug!("Plain sign-in attempt for '{}'", email);
                let entry = self
                    .config
                    .users
                    .iter()
                    .find(|u| u.email.eq_ignore_ascii_case(email))
                    .ok_or_else(|| ProviderError::Rejected("EMAIL_NOT_FOUND".to_string()))?;

                if entry.password != *password {
                    return Err(ProviderError::Rejected("INVALID_PASSWORD".to_string()));
                }

                Ok(self.issue(ProviderUser {
                    uid: entry.uid.clone(),
                    email: entry.email.clone(),
                    email_verified: entry.email_verified,
                    is_anonymous: false,
                    provider_data: vec![ProviderIdentity {
                        provider_id: "password".to_string(),
                        uid: entry.email.clone(),
                        display_name: entry.display_name.clone(),
                        email: Some(entry.email.clone()),
                        phone_number: None,
                        photo_url: None,
                    }],
                    ..Default::default()
                }))
            }
            Credentials::Anonymous => {
                if !self.config.allow_anonymous {
                    return Err(ProviderError::UnsupportedCredentials {
                        provider: self.config.name.clone(),
                        kind: credentials.kind().to_string(),
                    });
                }
                Ok(self.issue(ProviderUser {
                    uid: uuid::Uuid::new_v4().to_string(),
                    is_anonymous: true,
                    ..Default::default()
                }))
            }
        }
    }
}
