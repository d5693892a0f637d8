use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::ModelError;

/// The identity provider's user record, kept as a closed type.
///
/// Field names follow the provider's JSON (`emailVerified`, `providerData`,
/// `stsTokenManager`, ...). Optional fields default when absent and unknown
/// fields are dropped.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProviderUser {
    pub uid: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub email: String,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default)]
    pub is_anonymous: bool,
    #[serde(default)]
    pub provider_data: Vec<ProviderIdentity>,
    #[serde(
        default,
        rename = "stsTokenManager",
        alias = "tokenInfo",
        skip_serializing_if = "Option::is_none"
    )]
    pub token_info: Option<TokenInfo>,
    #[serde(default, with = "epoch_millis", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "epoch_millis", skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_name: Option<String>,
}

/// One linked credential (password, google.com, github.com, ...).
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProviderIdentity {
    pub provider_id: String,
    pub uid: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default, rename = "photoURL", alias = "photoUrl")]
    pub photo_url: Option<String>,
}

/// Token bookkeeping as handed over by the provider. Never validated here.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfo {
    pub refresh_token: String,
    pub access_token: String,
    /// Epoch milliseconds.
    pub expiration_time: i64,
}

impl TokenInfo {
    pub fn is_expired_at(&self, now_millis: i64) -> bool {
        now_millis >= self.expiration_time
    }
}

impl ProviderUser {
    /// Normalize a raw provider response into a `ProviderUser`.
    pub fn from_json(value: Value) -> Result<Self, ModelError> {
        let object = value
            .as_object()
            .ok_or(ModelError::NotAnObject("provider user"))?;

        match object.get("uid") {
            Some(Value::String(uid)) if !uid.is_empty() => {}
            _ => return Err(ModelError::MissingField("uid")),
        }

        Ok(serde_json::from_value(value)?)
    }

    /// First non-empty display name among the linked identities.
    pub fn display_name(&self) -> Option<&str> {
        self.provider_data
            .iter()
            .filter_map(|p| p.display_name.as_deref())
            .find(|name| !name.is_empty())
    }

    /// First photo URL among the linked identities.
    pub fn photo_url(&self) -> Option<&str> {
        self.provider_data
            .iter()
            .find_map(|p| p.photo_url.as_deref())
    }

    pub fn access_token(&self) -> Option<&str> {
        self.token_info.as_ref().map(|t| t.access_token.as_str())
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Provider timestamps are epoch milliseconds, sent either as a string or a number.
mod epoch_millis {
    use chrono::{DateTime, TimeZone, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Millis {
        Number(i64),
        Text(String),
    }

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(ts) => serializer.serialize_str(&ts.timestamp_millis().to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = match Option::<Millis>::deserialize(deserializer)? {
            None => return Ok(None),
            Some(Millis::Number(n)) => n,
            Some(Millis::Text(s)) => s.trim().parse::<i64>().map_err(de::Error::custom)?,
        };

        Utc.timestamp_millis_opt(millis)
            .single()
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("timestamp out of range: {}", millis)))
    }
}
