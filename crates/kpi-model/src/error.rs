use std::path::PathBuf;

use crate::topic::{Field, Topic};

/// Configuration problems. All of these are raised before any warehouse call.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse TOML config {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("unknown topic: {0}")]
    UnknownTopic(String),

    #[error("unknown field: {0}")]
    UnknownField(String),

    #[error("field {field} does not belong to topic {topic}")]
    FieldNotInTopic { topic: Topic, field: String },

    #[error("country {0:?} is not in the configured country list")]
    UnknownCountry(String),

    #[error("no benchmark source configured for {topic}.{field}")]
    MissingBenchmark { topic: Topic, field: Field },

    #[error("invalid configuration: {message}")]
    Invalid { message: String },
}

impl ConfigError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
