//! Reader side of the PDL release comparison.
//!
//! Rebuilds table names from topic, field and country, loads the generated
//! tables through a [`kpi_warehouse::Warehouse`] and derives what the dashboard
//! shows:
//!
//! - **KPI**: coverage and profile counts per version.
//! - **Top values**: counts and shares of the top values by the new version.
//! - **Largest changes**: relative change from base to new, by magnitude.
//! - **Benchmarks**: topic-level OEWS/ACS and BLS comparisons.

pub mod benchmark;
pub mod derive;
pub mod error;
pub mod export;
pub mod panel;
pub mod table;

pub use benchmark::BenchmarkView;
pub use derive::{
    ChangeRow, ComparisonRow, ComparisonTable, DEGREE_ORDER, LongRow, NULL_LABEL, VersionColumn,
    change_rows, compute_pct_change, compute_percentages, order_by_degree, rank_by_abs_change,
    rank_top_n, reshape_wide_to_long,
};
pub use error::{ReportError, Result};
pub use export::{changes_frame, export_dashboard, long_frame, write_csv};
pub use panel::{
    BenchmarkPanel, ComparisonView, DEFAULT_CHANGE_LIMIT, Dashboard, FieldPanel, PanelError,
    ReportOptions, ReportScope, read_benchmark_panel, read_dashboard, read_field_panel,
    read_scope,
};
pub use table::{KpiMetric, KpiSummary, comparison_from_frame};
