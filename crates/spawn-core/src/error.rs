//! Error types for spawn.

use thiserror::Error;

/// Top-level result type for spawn operations.
pub type Result<T> = std::result::Result<T, SpawnError>;

/// Top-level error type for spawn.
#[derive(Debug, Error)]
pub enum SpawnError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("could not create {last_path} after {max_attempts} attempts")]
    CreationExhausted {
        last_path: String,
        max_attempts: usize,
    },

    #[error("creation failed: {0}")]
    Create(#[from] CreateError),

    #[error("frontmatter error: {0}")]
    Frontmatter(String),

    #[error("vault error: {0}")]
    Vault(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Errors caused by user configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not find the template folder at {path}. Please update the settings.")]
    TemplateFolderNotFound { path: String },

    #[error("invalid value '{value}' for setting '{key}'")]
    InvalidSetting { key: String, value: String },
}

/// Failure reported by a store's create capability.
///
/// Only [`CreateError::AlreadyExists`] is retried by the creator; every
/// other failure is fatal for the creation flow.
#[derive(Debug, Error)]
pub enum CreateError {
    #[error("{path} already exists")]
    AlreadyExists { path: String },

    #[error("could not write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl CreateError {
    /// Whether this failure is a naming conflict that a new basename can fix.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. })
    }
}
