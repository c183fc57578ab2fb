//! Statement planning for one topic run.

use kpi_model::{ComparisonConfig, Field, QualifiedName, TableKind, Topic, TopicSpec};
use tracing::debug;

use crate::error::{Result, SqlError};
use crate::filter::SourceFilter;
use crate::query::{
    TopN, create_or_replace, generate_comparison_query, generate_kpi_query,
    generate_top_n_comparison_query,
};

/// What to generate for a topic.
#[derive(Debug, Clone)]
pub struct PlanOptions {
    /// Fields to generate; empty means every field of the topic.
    pub fields: Vec<Field>,
    /// Canonical country names; empty means unscoped tables only.
    pub countries: Vec<String>,
    pub kinds: Vec<TableKind>,
    pub top_n: TopN,
}

impl PlanOptions {
    pub fn new(top_n: TopN) -> Self {
        Self {
            fields: Vec::new(),
            countries: Vec::new(),
            kinds: TableKind::ALL.to_vec(),
            top_n,
        }
    }

    #[must_use]
    pub fn with_fields(mut self, fields: Vec<Field>) -> Self {
        self.fields = fields;
        self
    }

    #[must_use]
    pub fn with_countries(mut self, countries: Vec<String>) -> Self {
        self.countries = countries;
        self
    }

    #[must_use]
    pub fn with_kinds(mut self, kinds: Vec<TableKind>) -> Self {
        self.kinds = kinds;
        self
    }
}

/// A ready-to-run `CREATE OR REPLACE TABLE` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedTable {
    pub kind: TableKind,
    pub topic: Topic,
    pub field: Field,
    pub country: Option<String>,
    pub table: QualifiedName,
    pub statement: String,
}

/// A table intentionally not generated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedTable {
    pub kind: TableKind,
    pub table: QualifiedName,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanEntry {
    Ready(PlannedTable),
    Skipped(SkippedTable),
}

/// Statements for one topic run, in execution order.
#[derive(Debug, Clone, Default)]
pub struct GenerationPlan {
    pub entries: Vec<PlanEntry>,
}

impl GenerationPlan {
    pub fn ready(&self) -> impl Iterator<Item = &PlannedTable> {
        self.entries.iter().filter_map(|entry| match entry {
            PlanEntry::Ready(table) => Some(table),
            PlanEntry::Skipped(_) => None,
        })
    }

    pub fn skipped(&self) -> impl Iterator<Item = &SkippedTable> {
        self.entries.iter().filter_map(|entry| match entry {
            PlanEntry::Skipped(table) => Some(table),
            PlanEntry::Ready(_) => None,
        })
    }

    pub fn ready_count(&self) -> usize {
        self.ready().count()
    }
}

/// Build every statement for a topic.
///
/// Order is field, then country, then table kind (KPI, comparison, top-N).
/// Top-N tables ranked by a benchmark the field does not have are skipped;
/// every other problem is an error.
pub fn plan_topic(
    config: &ComparisonConfig,
    spec: &TopicSpec,
    options: &PlanOptions,
) -> Result<GenerationPlan> {
    let fields: Vec<Field> = if options.fields.is_empty() {
        spec.topic.fields().to_vec()
    } else {
        options.fields.clone()
    };
    let scopes: Vec<Option<&str>> = if options.countries.is_empty() {
        vec![None]
    } else {
        options.countries.iter().map(|c| Some(c.as_str())).collect()
    };

    let mut plan = GenerationPlan::default();
    for field in fields {
        let mapping = spec.field(field)?;
        for country in &scopes {
            let filter = SourceFilter::new(&spec.exclude_values)
                .with_extra_where(spec.extra_where.as_deref())
                .with_country(*country);
            for kind in &options.kinds {
                let table = config.qualified(&kind.table_name(spec.topic, field, *country));
                let query = match kind {
                    TableKind::Kpi => generate_kpi_query(mapping, &config.versions, &filter),
                    TableKind::Comparison => {
                        generate_comparison_query(mapping, &config.versions, &filter)
                    }
                    TableKind::BenchmarkComparison => match generate_top_n_comparison_query(
                        mapping,
                        &config.versions,
                        &filter,
                        options.top_n,
                    ) {
                        Ok(query) => query,
                        Err(SqlError::MissingBenchmark { .. }) => {
                            debug!(table = %table, "no benchmark source, skipping top-n table");
                            plan.entries.push(PlanEntry::Skipped(SkippedTable {
                                kind: *kind,
                                table,
                                reason: "no benchmark source configured".to_string(),
                            }));
                            continue;
                        }
                        Err(error) => return Err(error),
                    },
                };
                let statement = create_or_replace(&table.to_string(), &query);
                plan.entries.push(PlanEntry::Ready(PlannedTable {
                    kind: *kind,
                    topic: spec.topic,
                    field,
                    country: country.map(String::from),
                    table,
                    statement,
                }));
            }
        }
    }
    Ok(plan)
}
