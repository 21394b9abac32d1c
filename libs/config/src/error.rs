//! Persistent-store errors (§7's "Persistence" taxonomy entry).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("key not found: {namespace}/{key}")]
    NotFound { namespace: &'static str, key: String },

    #[error("counter not found: {0}")]
    CounterNotFound(String),

    #[error("failed to read store at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse store contents: {0}")]
    Deserialize(#[from] toml::de::Error),

    #[error("failed to serialize store contents: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("counter {0} would overflow u32")]
    CounterOverflow(String),
}

impl ConfigError {
    pub fn category(&self) -> &'static str {
        "persistence"
    }

    /// A caller reading a key that has never been provisioned is not a
    /// fault of the store itself.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ConfigError::Io { .. })
    }
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
