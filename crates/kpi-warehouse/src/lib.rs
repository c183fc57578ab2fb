//! Warehouse access for PDL release comparison tables.
//!
//! The generator executes `CREATE OR REPLACE TABLE` statements and the reader
//! loads tables back into frames, both through the [`Warehouse`] trait:
//!
//! - [`SqlApiWarehouse`]: the live warehouse over its SQL REST API.
//! - [`ScriptWarehouse`]: dry runs, statements appended to a script.
//! - [`SnapshotWarehouse`]: tables exported as CSV files.

pub mod error;
pub mod response;
pub mod script;
pub mod session;
pub mod snapshot;
pub mod sql_api;

use kpi_model::QualifiedName;
use polars::prelude::DataFrame;

pub use error::{FailureKind, Result, WarehouseError};
pub use script::ScriptWarehouse;
pub use session::SessionCache;
pub use snapshot::SnapshotWarehouse;
pub use sql_api::{SqlApiConfig, SqlApiWarehouse, TOKEN_ENV_VAR, token_from_env};

/// A place generated tables are written to and read from.
pub trait Warehouse {
    /// Backend name used in logs.
    fn name(&self) -> &'static str;

    /// Run a statement that returns no rows the caller needs.
    fn execute(&self, statement: &str) -> Result<()>;

    /// Load an entire table.
    fn read_table(&self, table: &QualifiedName) -> Result<DataFrame>;
}
