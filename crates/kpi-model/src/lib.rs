//! Data model for PDL release comparisons: topics, fields, resolved mappings,
//! configuration and the warehouse naming convention.

pub mod config;
pub mod error;
pub mod mapping;
pub mod naming;
pub mod topic;

pub use config::{
    BenchmarkSettings, ComparisonConfig, DEFAULT_TOP_N, FieldOverride, TopicSettings, VersionPair,
    WarehouseSettings,
};
pub use error::{ConfigError, Result};
pub use mapping::{BenchmarkSource, FieldMapping, SourceExpr, TopicSpec};
pub use naming::{QualifiedName, TableKind, clean_name, make_table_name, version_alias};
pub use topic::{Field, Topic};
