//! Error types for the comparison reader.

use std::path::PathBuf;

use kpi_model::ConfigError;
use kpi_warehouse::WarehouseError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Warehouse(#[from] WarehouseError),

    /// A column the table layout requires is absent.
    #[error("missing column {column}")]
    MissingColumn { column: String },

    #[error("table has no rows")]
    EmptyTable,

    #[error("frame error: {0}")]
    Frame(String),

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ReportError {
    pub(crate) fn missing(column: impl Into<String>) -> Self {
        Self::MissingColumn {
            column: column.into(),
        }
    }
}

impl From<polars::error::PolarsError> for ReportError {
    fn from(err: polars::error::PolarsError) -> Self {
        Self::Frame(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;
