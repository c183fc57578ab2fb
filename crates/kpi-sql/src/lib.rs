//! SQL generation for PDL release comparison tables.
//!
//! Three query shapes are produced per field, each wrapped in
//! `CREATE OR REPLACE TABLE <name> AS <query>`:
//!
//! - KPI: coverage and profile counts per version ([`generate_kpi_query`])
//! - comparison: per-value counts ([`generate_comparison_query`])
//! - top-N comparison: per-value counts and shares for the values ranked
//!   highest by the benchmark ([`generate_top_n_comparison_query`])
//!
//! [`plan_topic`] builds every statement of a topic run up front, so
//! configuration problems surface before the warehouse is touched.

pub mod error;
pub mod filter;
pub mod plan;
pub mod query;

pub use error::{Result, SqlError};
pub use filter::{SourceFilter, quote_literal};
pub use plan::{GenerationPlan, PlanEntry, PlanOptions, PlannedTable, SkippedTable, plan_topic};
pub use query::{
    RankSource, TopN, create_or_replace, generate_comparison_query, generate_kpi_query,
    generate_top_n_comparison_query,
};
