use std::path::Path;

use figment::providers::{Env, Format, Yaml};
use figment::Figment;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};

use super::logging::LoggingConfig;
use super::persistence::PersistenceConfig;
use crate::error::ConfigError;
use crate::providers::ProviderConfig;
use crate::stores::VisibleProfileClearPolicy;

/// Environment variable naming the YAML config file.
pub const CONFIG_PATH_ENV: &str = "FIND_USERS_CONFIG";
/// Prefix for environment overrides, e.g. `FIND_USERS_LOGGING__LEVEL=debug`.
pub const ENV_PREFIX: &str = "FIND_USERS_";

/// A top-level enum for versioned configurations.
#[derive(Deserialize, Serialize, JsonSchema)]
#[serde(tag = "version")]
pub enum Config {
    #[serde(rename = "1.0.0")]
    ConfigV1(ConfigV1),
}

/// Main config for v1.0.0.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct ConfigV1 {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    pub provider: ProviderConfig,
    #[serde(default)]
    pub persistence: PersistenceConfig,
    #[serde(default)]
    pub profile: ProfileConfig,
}

/// Limits applied around identity provider calls.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct AuthConfig {
    pub timeout_in_ms: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            timeout_in_ms: 10_000,
        }
    }
}

/// Behaviour of the profile store.
#[derive(Deserialize, Serialize, Debug, Clone, Default, JsonSchema)]
pub struct ProfileConfig {
    #[serde(default)]
    pub clear_policy: VisibleProfileClearPolicy,
}

/// Layers the YAML file at `path` under `FIND_USERS_*` environment overrides.
pub fn figment(path: impl AsRef<Path>) -> Figment {
    Figment::new()
        .merge(Yaml::file(path.as_ref()))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
}

/// Extract a versioned config from any figment.
pub fn extract_config(figment: &Figment) -> Result<ConfigV1, ConfigError> {
    match figment.extract::<Config>()? {
        Config::ConfigV1(c) => Ok(c),
    }
    // handle configuration migration between versions here when necessary
}

/// Load config from `$FIND_USERS_CONFIG`, defaulting to "./config.yaml".
pub fn load_config() -> Result<ConfigV1, ConfigError> {
    let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| "./config.yaml".to_string());
    extract_config(&figment(path))
}

/// Print the JSON schema for the configuration to stdout.
pub fn print_schema() -> Result<(), serde_json::Error> {
    let schema = schema_for!(Config);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}
