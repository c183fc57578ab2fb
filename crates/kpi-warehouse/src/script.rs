//! Dry-run backend that writes statements to a SQL script.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use kpi_model::QualifiedName;
use polars::prelude::DataFrame;
use tracing::debug;

use crate::Warehouse;
use crate::error::{Result, WarehouseError};

/// Appends every executed statement to one `.sql` file.
#[derive(Debug)]
pub struct ScriptWarehouse {
    path: PathBuf,
}

impl ScriptWarehouse {
    /// Create (or truncate) `<dir>/<file_name>`.
    pub fn create(dir: &Path, file_name: &str) -> Result<Self> {
        fs::create_dir_all(dir).map_err(|e| WarehouseError::io(dir, e))?;
        let path = dir.join(file_name);
        File::create(&path).map_err(|e| WarehouseError::io(&path, e))?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Warehouse for ScriptWarehouse {
    fn name(&self) -> &'static str {
        "script"
    }

    fn execute(&self, statement: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(|e| WarehouseError::io(&self.path, e))?;
        writeln!(file, "{};\n", statement.trim_end())
            .map_err(|e| WarehouseError::io(&self.path, e))?;
        debug!(path = %self.path.display(), "statement written");
        Ok(())
    }

    fn read_table(&self, _table: &QualifiedName) -> Result<DataFrame> {
        Err(WarehouseError::Unsupported {
            backend: self.name(),
            operation: "read tables",
        })
    }
}
