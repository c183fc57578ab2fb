//! Error types for warehouse access.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Coarse classification of a warehouse failure, used in run summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    Config,
    Sql,
    MissingTable,
    Permission,
    Network,
    Timeout,
    Io,
    Unsupported,
    Other,
}

impl FailureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Config => "config",
            Self::Sql => "sql",
            Self::MissingTable => "missing table",
            Self::Permission => "permission",
            Self::Network => "network",
            Self::Timeout => "timeout",
            Self::Io => "io",
            Self::Unsupported => "unsupported",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by a [`crate::Warehouse`] backend.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WarehouseError {
    /// Backend settings are incomplete.
    #[error("warehouse not configured: {0}")]
    NotConfigured(String),

    /// Network request failed.
    #[error("network error: {0}")]
    Network(String),

    /// The request or the statement exceeded its time limit.
    #[error("timed out: {0}")]
    Timeout(String),

    /// Rejected credentials or missing privileges.
    #[error("permission denied (HTTP {status}): {message}")]
    Permission { status: u16, message: String },

    /// The referenced table or view is absent.
    #[error("object does not exist or is not authorized: {message}")]
    MissingTable { message: String },

    /// The warehouse rejected the statement.
    #[error("SQL error {code}: {message}")]
    Sql {
        code: String,
        sql_state: Option<String>,
        message: String,
    },

    /// Unexpected HTTP status from the warehouse API.
    #[error("warehouse API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// Response body did not have the expected shape.
    #[error("invalid warehouse response: {0}")]
    InvalidResponse(String),

    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Snapshot file could not be parsed into a frame.
    #[error("failed to read {path}: {message}")]
    Frame { path: PathBuf, message: String },

    #[error("the {backend} backend cannot {operation}")]
    Unsupported {
        backend: &'static str,
        operation: &'static str,
    },
}

impl WarehouseError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::NotConfigured(_) => FailureKind::Config,
            Self::Network(_) => FailureKind::Network,
            Self::Timeout(_) => FailureKind::Timeout,
            Self::Permission { .. } => FailureKind::Permission,
            Self::MissingTable { .. } => FailureKind::MissingTable,
            Self::Sql { .. } => FailureKind::Sql,
            Self::Io { .. } | Self::Frame { .. } => FailureKind::Io,
            Self::Unsupported { .. } => FailureKind::Unsupported,
            Self::Api { .. } | Self::InvalidResponse(_) => FailureKind::Other,
        }
    }
}

impl From<reqwest::Error> for WarehouseError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for WarehouseError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidResponse(err.to_string())
    }
}

/// Result type alias for warehouse operations.
pub type Result<T> = std::result::Result<T, WarehouseError>;
