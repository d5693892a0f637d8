use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::persistence::file_persistence::FilePersistenceConfig;

/// The storage key the session token is mirrored under.
pub const DEFAULT_TOKEN_KEY: &str = "find-users-Token";

/// A wrapper for the session persistence configuration:
/// - enabled: if false, tokens live in memory only (NoPersistence).
/// - token_key: the fixed key the token is stored under.
/// - backend: the actual backend (memory, file).
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct PersistenceConfig {
    pub enabled: bool,
    #[serde(default = "default_token_key")]
    pub token_key: String,
    #[serde(flatten)]
    pub backend: Option<PersistenceBackend>,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            token_key: default_token_key(),
            backend: Some(PersistenceBackend::Memory),
        }
    }
}

/// The available backends, selected via a "type" tag in the YAML.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
#[serde(tag = "type")]
pub enum PersistenceBackend {
    #[serde(rename = "memory")]
    Memory,
    #[serde(rename = "file")]
    File(FilePersistenceConfig),
}

fn default_token_key() -> String {
    DEFAULT_TOKEN_KEY.to_string()
}
