//! Read-only backend over exported CSV snapshots.
//!
//! A snapshot directory holds one `<TABLE>.csv` per generated table, as
//! exported from the warehouse. Database and schema are ignored.

use std::path::{Path, PathBuf};

use kpi_model::QualifiedName;
use polars::prelude::*;
use tracing::debug;

use crate::Warehouse;
use crate::error::{Result, WarehouseError};

#[derive(Debug, Clone)]
pub struct SnapshotWarehouse {
    dir: PathBuf,
}

impl SnapshotWarehouse {
    pub fn open(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            return Err(WarehouseError::NotConfigured(format!(
                "snapshot directory {} does not exist",
                dir.display()
            )));
        }
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    /// File expected to hold `table`.
    pub fn table_path(&self, table: &QualifiedName) -> PathBuf {
        self.dir.join(format!("{}.csv", table.table))
    }
}

impl Warehouse for SnapshotWarehouse {
    fn name(&self) -> &'static str {
        "snapshot"
    }

    fn execute(&self, _statement: &str) -> Result<()> {
        Err(WarehouseError::Unsupported {
            backend: self.name(),
            operation: "execute statements",
        })
    }

    fn read_table(&self, table: &QualifiedName) -> Result<DataFrame> {
        let path = self.table_path(table);
        if !path.is_file() {
            return Err(WarehouseError::MissingTable {
                message: format!("{table} (no {})", path.display()),
            });
        }
        debug!(path = %path.display(), "reading snapshot");
        CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(100))
            .try_into_reader_with_file_path(Some(path.clone()))
            .and_then(|reader| reader.finish())
            .map_err(|e| WarehouseError::Frame {
                path,
                message: e.to_string(),
            })
    }
}
