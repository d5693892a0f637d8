//! Error types shared across the crate.
//!
//! Stores never fail on their own; errors only come from the edges: the
//! session persistence backend, the identity provider, configuration loading,
//! and normalization of provider JSON.

/// Failure while mirroring a value into session persistence.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("Session persistence is disabled")]
    Disabled,

    #[error("Session persistence I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session persistence serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failure reported by (or while talking to) an identity provider.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The provider answered and refused the credentials, e.g. `INVALID_PASSWORD`.
    #[error("Sign-in rejected by provider: {0}")]
    Rejected(String),

    #[error("Could not reach identity provider: {0}")]
    Transport(String),

    #[error("Identity provider returned an invalid response: {0}")]
    InvalidResponse(String),

    #[error("Provider '{provider}' does not support {kind} credentials")]
    UnsupportedCredentials { provider: String, kind: String },

    #[error("Identity provider timed out after {0} ms")]
    Timeout(u64),
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ProviderError::InvalidResponse(e.to_string())
        } else {
            ProviderError::Transport(e.to_string())
        }
    }
}

impl From<ModelError> for ProviderError {
    fn from(e: ModelError) -> Self {
        ProviderError::InvalidResponse(e.to_string())
    }
}

/// Provider JSON that cannot be normalized into a typed record.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Expected a JSON object for {0}")]
    NotAnObject(&'static str),

    #[error("Missing required field '{0}'")]
    MissingField(&'static str),

    #[error("Malformed provider record: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Configuration could not be loaded or parsed.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Error loading configuration: {0}")]
    Figment(#[from] Box<figment::Error>),

    #[error("Invalid logging.level '{0}'. Valid values: trace, debug, info, warn, error")]
    InvalidLogLevel(String),
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        ConfigError::Figment(Box::new(e))
    }
}
