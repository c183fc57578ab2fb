//! Dashboard assembly: one panel per field, plus the topic benchmark view.
//!
//! Each panel reads its tables independently. A failed read is kept on the
//! panel together with the table it expected, and the other panels carry on.

use std::fmt;

use kpi_model::{ComparisonConfig, ConfigError, Field, QualifiedName, TableKind, Topic};
use kpi_warehouse::{FailureKind, Warehouse};
use tracing::{debug, info_span, warn};

use crate::benchmark::BenchmarkView;
use crate::derive::{
    ChangeRow, ComparisonTable, change_rows, compute_percentages, order_by_degree,
    rank_by_abs_change, rank_top_n,
};
use crate::error::{ReportError, Result};
use crate::table::{KpiSummary, comparison_from_frame};

/// Largest-changes panels show at most this many values.
pub const DEFAULT_CHANGE_LIMIT: usize = 20;

/// Degree panels follow the degree ladder only next to this benchmark column.
const DEGREE_BENCHMARK_COLUMN: &str = "cnt_ipeds";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportOptions {
    /// Values shown in the counts and percentages panels.
    pub top_n: usize,
    pub change_limit: usize,
}

impl ReportOptions {
    pub fn new(top_n: usize) -> Self {
        Self {
            top_n,
            change_limit: DEFAULT_CHANGE_LIMIT,
        }
    }
}

/// A table that could not be shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelError {
    pub table: QualifiedName,
    /// Warehouse classification, `None` for layout problems.
    pub kind: Option<FailureKind>,
    pub message: String,
}

impl PanelError {
    fn new(table: &QualifiedName, error: &ReportError) -> Self {
        let kind = match error {
            ReportError::Warehouse(inner) => Some(inner.kind()),
            _ => None,
        };
        Self {
            table: table.clone(),
            kind,
            message: error.to_string(),
        }
    }
}

impl fmt::Display for PanelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (expected table: {})", self.message, self.table)
    }
}

/// Derived views of one comparison table.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonView {
    /// Top values by the new version's count.
    pub top_counts: ComparisonTable,
    /// Shares of [`Self::top_counts`] within each column.
    pub top_percentages: ComparisonTable,
    /// Largest relative changes from base to new.
    pub largest_changes: Vec<ChangeRow>,
}

impl ComparisonView {
    /// `None` for an empty table.
    pub fn build(table: &ComparisonTable, field: Field, options: ReportOptions) -> Option<Self> {
        if table.is_empty() {
            return None;
        }
        let mut top = rank_top_n(table.rows.clone(), options.top_n, |row| row.values[1]);
        if field.is_degree_level() && table.column_index(DEGREE_BENCHMARK_COLUMN).is_some() {
            top = order_by_degree(top);
        }
        let top_counts = table.with_rows(top);
        let top_percentages = compute_percentages(&top_counts);
        let largest_changes = rank_by_abs_change(change_rows(table, 0, 1), options.change_limit);
        Some(Self {
            top_counts,
            top_percentages,
            largest_changes,
        })
    }
}

/// Everything shown for one field.
#[derive(Debug, Clone)]
pub struct FieldPanel {
    pub topic: Topic,
    pub field: Field,
    pub country: Option<String>,
    pub note: Option<&'static str>,
    pub kpi_table: QualifiedName,
    pub comparison_table: QualifiedName,
    pub kpi: std::result::Result<KpiSummary, PanelError>,
    /// `Ok(None)` when the table exists but is empty.
    pub comparison: std::result::Result<Option<ComparisonView>, PanelError>,
}

impl FieldPanel {
    pub fn error_count(&self) -> usize {
        usize::from(self.kpi.is_err()) + usize::from(self.comparison.is_err())
    }
}

/// The topic benchmark view.
#[derive(Debug, Clone)]
pub struct BenchmarkPanel {
    pub view: BenchmarkView,
    pub title: String,
    pub table_name: QualifiedName,
    pub table: std::result::Result<Option<ComparisonTable>, PanelError>,
}

#[derive(Debug, Clone)]
pub struct Dashboard {
    pub topic: Topic,
    pub country: Option<String>,
    pub panels: Vec<FieldPanel>,
    pub benchmark: Option<BenchmarkPanel>,
}

impl Dashboard {
    pub fn error_count(&self) -> usize {
        let benchmark = self
            .benchmark
            .as_ref()
            .is_some_and(|panel| panel.table.is_err());
        self.panels
            .iter()
            .map(FieldPanel::error_count)
            .sum::<usize>()
            + usize::from(benchmark)
    }
}

/// Topic, country and fields of a dashboard, checked against the config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportScope {
    pub topic: Topic,
    /// Canonical country name.
    pub country: Option<String>,
    pub fields: Vec<Field>,
}

impl ReportScope {
    /// With no fields, the topic's first field is shown.
    pub fn resolve(
        config: &ComparisonConfig,
        topic: Topic,
        country: Option<&str>,
        fields: &[Field],
    ) -> Result<Self> {
        let country = country
            .map(|c| config.resolve_country(c).map(String::from))
            .transpose()?;
        let fields: Vec<Field> = if fields.is_empty() {
            topic.fields().iter().take(1).copied().collect()
        } else {
            fields.to_vec()
        };
        if let Some(field) = fields.iter().find(|f| f.topic() != topic) {
            return Err(ConfigError::FieldNotInTopic {
                topic,
                field: field.column_name().to_string(),
            }
            .into());
        }
        Ok(Self {
            topic,
            country,
            fields,
        })
    }
}

/// Read every panel of a topic.
///
/// Fields and country are checked before any warehouse call.
pub fn read_dashboard(
    warehouse: &dyn Warehouse,
    config: &ComparisonConfig,
    topic: Topic,
    country: Option<&str>,
    fields: &[Field],
    options: ReportOptions,
) -> Result<Dashboard> {
    let scope = ReportScope::resolve(config, topic, country, fields)?;
    Ok(read_scope(warehouse, config, scope, options))
}

/// Read every panel of an already resolved scope.
pub fn read_scope(
    warehouse: &dyn Warehouse,
    config: &ComparisonConfig,
    scope: ReportScope,
    options: ReportOptions,
) -> Dashboard {
    let ReportScope {
        topic,
        country,
        fields,
    } = scope;
    let panels = fields
        .iter()
        .map(|field| read_field_panel(warehouse, config, topic, *field, country.as_deref(), options))
        .collect();
    let benchmark =
        BenchmarkView::for_topic(topic).map(|view| read_benchmark_panel(warehouse, config, view));
    Dashboard {
        topic,
        country,
        panels,
        benchmark,
    }
}

pub fn read_field_panel(
    warehouse: &dyn Warehouse,
    config: &ComparisonConfig,
    topic: Topic,
    field: Field,
    country: Option<&str>,
    options: ReportOptions,
) -> FieldPanel {
    let span = info_span!("panel", topic = %topic, field = %field);
    let _guard = span.enter();

    let kpi_table = config.qualified(&TableKind::Kpi.table_name(topic, field, country));
    let comparison_table =
        config.qualified(&TableKind::Comparison.table_name(topic, field, country));

    let kpi = warehouse
        .read_table(&kpi_table)
        .map_err(ReportError::from)
        .and_then(|df| KpiSummary::from_frame(&df, &config.versions))
        .map_err(|e| panel_error(&kpi_table, &e));

    let comparison = warehouse
        .read_table(&comparison_table)
        .map_err(ReportError::from)
        .and_then(|df| comparison_from_frame(&df, &config.versions))
        .map(|table| ComparisonView::build(&table, field, options))
        .map_err(|e| panel_error(&comparison_table, &e));

    FieldPanel {
        topic,
        field,
        country: country.map(String::from),
        note: field.note(),
        kpi_table,
        comparison_table,
        kpi,
        comparison,
    }
}

pub fn read_benchmark_panel(
    warehouse: &dyn Warehouse,
    config: &ComparisonConfig,
    view: BenchmarkView,
) -> BenchmarkPanel {
    let table_name = config.qualified(view.table_name());
    let table = warehouse
        .read_table(&table_name)
        .map_err(ReportError::from)
        .and_then(|df| view.read(&df, &config.versions))
        .map(|table| (!table.is_empty()).then_some(table))
        .map_err(|e| panel_error(&table_name, &e));
    debug!(table = %table_name, ok = table.is_ok(), "benchmark view read");
    BenchmarkPanel {
        view,
        title: view.title(&config.versions),
        table_name,
        table,
    }
}

fn panel_error(table: &QualifiedName, error: &ReportError) -> PanelError {
    let panel = PanelError::new(table, error);
    warn!(table = %table, error = %panel.message, "panel read failed");
    panel
}
