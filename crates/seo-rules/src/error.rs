use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("duplicate rule id: {id}")]
    DuplicateRule { id: String },

    #[error("invalid threshold {name}: {message}")]
    InvalidThreshold { name: String, message: String },

    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl RuleError {
    pub(crate) fn threshold(name: &str, message: impl Into<String>) -> Self {
        Self::InvalidThreshold {
            name: name.to_string(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RuleError>;
