use chrono::Utc;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::error::ProviderError;
use crate::models::ProviderUser;
use crate::providers::{Credentials, IdentityProvider, SignInResult};

const DEFAULT_IDENTITY_TOOLKIT_URL: &str = "https://identitytoolkit.googleapis.com";

/// The config needed to sign in against a Firebase project.
#[derive(Deserialize, Serialize, Debug, JsonSchema, Clone)]
pub struct FirebaseProviderConfig {
    pub name: String,
    pub api_key: String,
    pub project_id: String,
    /// Overridable so tests can point at a mock server.
    #[serde(default = "default_identity_toolkit_url")]
    pub identity_toolkit_url: String,
}

fn default_identity_toolkit_url() -> String {
    DEFAULT_IDENTITY_TOOLKIT_URL.to_string()
}

/// Signs users in through the Firebase Identity Toolkit REST API.
pub struct FirebaseProvider {
    pub config: FirebaseProviderConfig,
    client: reqwest::Client,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    local_id: String,
    id_token: String,
    refresh_token: String,
    expires_in: String,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Deserialize, Debug)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<LookupUser>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct LookupUser {
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    email_verified: bool,
    #[serde(default)]
    provider_user_info: Vec<LookupProviderInfo>,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    last_login_at: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct LookupProviderInfo {
    provider_id: String,
    #[serde(default)]
    raw_id: Option<String>,
    #[serde(default)]
    federated_id: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    phone_number: Option<String>,
    #[serde(default)]
    photo_url: Option<String>,
}

impl FirebaseProvider {
    pub fn new(config: &FirebaseProviderConfig) -> Self {
        info!(
            "Creating Firebase identity provider for project '{}', name='{}'",
            config.project_id, config.name
        );
        Self {
            config: config.clone(),
            client: reqwest::Client::new(),
        }
    }

    fn endpoint(&self, method: &str) -> String {
        format!(
            "{}/v1/accounts:{}?key={}",
            self.config.identity_toolkit_url.trim_end_matches('/'),
            method,
            self.config.api_key
        )
    }

    async fn post<T: DeserializeOwned>(&self, method: &str, body: &Value) -> Result<T, ProviderError> {
        debug!(
            provider_name = self.config.name.as_str(),
            method, "sending identity toolkit request"
        );
        let response = self
            .client
            .post(self.endpoint(method))
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let body = response.text().await.unwrap_or_default();
        match error_code(&body) {
            Some(code) => {
                warn!(
                    provider_name = self.config.name.as_str(),
                    method,
                    status = status.as_u16(),
                    code = code.as_str(),
                    "identity toolkit rejected request"
                );
                Err(ProviderError::Rejected(code))
            }
            None => Err(ProviderError::InvalidResponse(format!(
                "Unexpected status code: {}",
                status
            ))),
        }
    }

    /// Fetch the full account record for a freshly issued ID token and shape it
    /// like the client SDK's user object.
    async fn lookup(
        &self,
        signed_in: &SignInResponse,
        is_anonymous: bool,
    ) -> Result<ProviderUser, ProviderError> {
        let lookup: LookupResponse = self
            .post("lookup", &json!({ "idToken": signed_in.id_token }))
            .await?;
        let account = lookup
            .users
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::InvalidResponse("lookup returned no users".to_string()))?;

        let expires_in = signed_in.expires_in.trim().parse::<i64>().map_err(|e| {
            ProviderError::InvalidResponse(format!("invalid expiresIn '{}': {}", signed_in.expires_in, e))
        })?;

        let provider_data: Vec<Value> = account
            .provider_user_info
            .into_iter()
            .map(|info| {
                let uid = info.raw_id.or(info.federated_id).unwrap_or_default();
                json!({
                    "providerId": info.provider_id,
                    "uid": uid,
                    "displayName": info.display_name,
                    "email": info.email,
                    "phoneNumber": info.phone_number,
                    "photoURL": info.photo_url,
                })
            })
            .collect();

        let raw = json!({
            "uid": signed_in.local_id,
            "email": account.email.or_else(|| signed_in.email.clone()),
            "emailVerified": account.email_verified,
            "isAnonymous": is_anonymous,
            "providerData": provider_data,
            "stsTokenManager": {
                "refreshToken": signed_in.refresh_token,
                "accessToken": signed_in.id_token,
                "expirationTime": expiration_time(Utc::now().timestamp_millis(), expires_in),
            },
            "createdAt": account.created_at,
            "lastLoginAt": account.last_login_at,
            "apiKey": self.config.api_key,
        });

        Ok(ProviderUser::from_json(raw)?)
    }
}

#[async_trait::async_trait]
impl IdentityProvider for FirebaseProvider {
    fn get_name(&self) -> &str {
        &self.config.name
    }

    fn get_type(&self) -> &str {
        "firebase"
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<SignInResult, ProviderError> {
        let (signed_in, is_anonymous): (SignInResponse, bool) = match credentials {
            Credentials::EmailPassword { email, password } => (
                self.post(
                    "signInWithPassword",
                    &json!({
                        "email": email,
                        "password": password,
                        "returnSecureToken": true,
                    }),
                )
                .await?,
                false,
            ),
            Credentials::Anonymous => (
                self.post("signUp", &json!({ "returnSecureToken": true }))
                    .await?,
                true,
            ),
        };

        let user = self.lookup(&signed_in, is_anonymous).await?;
        info!(
            provider_name = self.config.name.as_str(),
            uid = user.uid.as_str(),
            anonymous = is_anonymous,
            "firebase sign-in succeeded"
        );

        Ok(SignInResult {
            token: signed_in.id_token,
            user,
        })
    }
}

/// Absolute expiry in epoch milliseconds for a token valid `expires_in_secs`
/// from `now_millis`. Saturates instead of overflowing on absurd lifetimes.
fn expiration_time(now_millis: i64, expires_in_secs: i64) -> i64 {
    now_millis.saturating_add(expires_in_secs.saturating_mul(1000))
}

/// Extracts the error code from `{"error": {"message": "CODE : detail"}}`.
fn error_code(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let message = value["error"]["message"].as_str()?;
    let code = message.split(" : ").next().unwrap_or(message).trim();
    if code.is_empty() {
        None
    } else {
        Some(code.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn config(url: String) -> FirebaseProviderConfig {
        FirebaseProviderConfig {
            name: "firebase-test".to_string(),
            api_key: "test-key".to_string(),
            project_id: "find-users-test".to_string(),
            identity_toolkit_url: url,
        }
    }

    const SIGN_IN_BODY: &str = r#"{
        "kind": "identitytoolkit#VerifyPasswordResponse",
        "localId": "u1",
        "email": "a@b.com",
        "displayName": "",
        "idToken": "id-token-1",
        "registered": true,
        "refreshToken": "refresh-1",
        "expiresIn": "3600"
    }"#;

    const LOOKUP_BODY: &str = r#"{
        "kind": "identitytoolkit#GetAccountInfoResponse",
        "users": [{
            "localId": "u1",
            "email": "a@b.com",
            "emailVerified": true,
            "providerUserInfo": [{
                "providerId": "password",
                "displayName": "Alice",
                "federatedId": "a@b.com",
                "email": "a@b.com",
                "rawId": "a@b.com"
            }],
            "createdAt": "1700000000000",
            "lastLoginAt": "1700000300000"
        }]
    }"#;

    /// A password sign-in followed by a lookup yields a fully populated ProviderUser.
    #[tokio::test]
    async fn test_firebase_sign_in_with_password() {
        let mut server = Server::new_async().await;
        let sign_in = server
            .mock("POST", "/v1/accounts:signInWithPassword?key=test-key")
            .match_body(Matcher::PartialJson(json!({
                "email": "a@b.com",
                "password": "secret",
                "returnSecureToken": true
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(SIGN_IN_BODY)
            .create_async()
            .await;
        let lookup = server
            .mock("POST", "/v1/accounts:lookup?key=test-key")
            .match_body(Matcher::Json(json!({ "idToken": "id-token-1" })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(LOOKUP_BODY)
            .create_async()
            .await;

        let provider = FirebaseProvider::new(&config(server.url()));
        let result = provider
            .sign_in(&Credentials::email_password("a@b.com", "secret"))
            .await
            .expect("sign-in should succeed");

        sign_in.assert_async().await;
        lookup.assert_async().await;

        assert_eq!(result.token, "id-token-1");
        assert_eq!(result.user.uid, "u1");
        assert_eq!(result.user.email, "a@b.com");
        assert!(result.user.email_verified);
        assert!(!result.user.is_anonymous);
        assert_eq!(result.user.display_name(), Some("Alice"));
        assert_eq!(result.user.provider_data[0].uid, "a@b.com");
        assert_eq!(result.user.api_key.as_deref(), Some("test-key"));

        let token_info = result.user.token_info.expect("token info should be set");
        assert_eq!(token_info.refresh_token, "refresh-1");
        assert_eq!(token_info.access_token, "id-token-1");
        assert!(token_info.expiration_time > Utc::now().timestamp_millis());
        assert_eq!(
            result.user.created_at.map(|t| t.timestamp_millis()),
            Some(1_700_000_000_000)
        );
    }

    /// A wrong password surfaces the provider's error code and skips the lookup.
    #[tokio::test]
    async fn test_firebase_invalid_password() {
        let mut server = Server::new_async().await;
        let sign_in = server
            .mock("POST", "/v1/accounts:signInWithPassword?key=test-key")
            .with_status(400)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error": {"code": 400, "message": "INVALID_PASSWORD", "errors": []}}"#)
            .create_async()
            .await;
        let lookup = server
            .mock("POST", "/v1/accounts:lookup?key=test-key")
            .expect(0)
            .create_async()
            .await;

        let provider = FirebaseProvider::new(&config(server.url()));
        let result = provider
            .sign_in(&Credentials::email_password("a@b.com", "wrong"))
            .await;

        sign_in.assert_async().await;
        lookup.assert_async().await;
        match result {
            Err(ProviderError::Rejected(code)) => assert_eq!(code, "INVALID_PASSWORD"),
            other => panic!("expected Rejected, got {:?}", other.map(|r| r.token)),
        }
    }

    /// Anonymous sign-in goes through signUp and marks the user anonymous.
    #[tokio::test]
    async fn test_firebase_anonymous_sign_in() {
        let mut server = Server::new_async().await;
        let _sign_up = server
            .mock("POST", "/v1/accounts:signUp?key=test-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"localId": "anon-1", "idToken": "anon-token", "refreshToken": "r", "expiresIn": "3600"}"#)
            .create_async()
            .await;
        let _lookup = server
            .mock("POST", "/v1/accounts:lookup?key=test-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"users": [{"localId": "anon-1", "createdAt": "1700000000000"}]}"#)
            .create_async()
            .await;

        let provider = FirebaseProvider::new(&config(server.url()));
        let result = provider.sign_in(&Credentials::Anonymous).await.unwrap();

        assert_eq!(result.token, "anon-token");
        assert!(result.user.is_anonymous);
        assert_eq!(result.user.email, "");
        assert!(result.user.provider_data.is_empty());
    }

    /// A non-JSON error body is reported as an invalid response rather than a rejection.
    #[tokio::test]
    async fn test_firebase_unexpected_error_body() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/v1/accounts:signInWithPassword?key=test-key")
            .with_status(503)
            .with_body("Service Unavailable")
            .create_async()
            .await;

        let provider = FirebaseProvider::new(&config(server.url()));
        let result = provider
            .sign_in(&Credentials::email_password("a@b.com", "secret"))
            .await;
        assert!(matches!(result, Err(ProviderError::InvalidResponse(_))));
    }

    #[test]
    fn test_expiration_time_saturates() {
        assert_eq!(expiration_time(1_000, 3600), 3_601_000);
        assert_eq!(expiration_time(1_700_000_000_000, i64::MAX), i64::MAX);
    }

    /// An absurd `expiresIn` still yields a user whose token never expires.
    #[tokio::test]
    async fn test_firebase_huge_expires_in() {
        let mut server = Server::new_async().await;
        let _sign_in = server
            .mock("POST", "/v1/accounts:signInWithPassword?key=test-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"localId": "u1", "idToken": "t", "refreshToken": "r", "expiresIn": "9223372036854775807"}"#)
            .create_async()
            .await;
        let _lookup = server
            .mock("POST", "/v1/accounts:lookup?key=test-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"users": [{"localId": "u1", "email": "a@b.com"}]}"#)
            .create_async()
            .await;

        let provider = FirebaseProvider::new(&config(server.url()));
        let result = provider
            .sign_in(&Credentials::email_password("a@b.com", "secret"))
            .await
            .expect("sign-in should succeed");

        let token_info = result.user.token_info.expect("token info should be set");
        assert_eq!(token_info.expiration_time, i64::MAX);
    }

    #[test]
    fn test_error_code_strips_detail() {
        assert_eq!(
            error_code(r#"{"error": {"message": "TOO_MANY_ATTEMPTS_TRY_LATER : Access disabled"}}"#),
            Some("TOO_MANY_ATTEMPTS_TRY_LATER".to_string())
        );
        assert_eq!(error_code("not json"), None);
        assert_eq!(error_code(r#"{"error": {}}"#), None);
    }
}
