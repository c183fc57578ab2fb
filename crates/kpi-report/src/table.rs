//! Typed views of the generated KPI and comparison tables.
//!
//! Column lookup is case-insensitive: the warehouse returns upper-case
//! identifiers, snapshots may not.

use kpi_common::{any_to_f64, any_to_string, column_names_lower, find_column};
use kpi_model::naming::{FIELD_VALUE_COLUMN, count_column, coverage_column, profiles_column};
use kpi_model::VersionPair;
use polars::prelude::{AnyValue, Column, DataFrame};

use crate::derive::{ComparisonRow, ComparisonTable, VersionColumn};
use crate::error::{ReportError, Result};

/// Coverage and profile count of one source.
#[derive(Debug, Clone, PartialEq)]
pub struct KpiMetric {
    pub label: String,
    pub coverage: f64,
    pub profiles: f64,
}

/// The single-row KPI table.
#[derive(Debug, Clone, PartialEq)]
pub struct KpiSummary {
    /// Base, new, then any benchmark.
    pub metrics: Vec<KpiMetric>,
}

impl KpiSummary {
    pub fn from_frame(df: &DataFrame, versions: &VersionPair) -> Result<Self> {
        if df.height() == 0 {
            return Err(ReportError::EmptyTable);
        }
        let mut metrics = vec![
            read_metric(df, &versions.base_alias(), &versions.base, true)?,
            read_metric(df, &versions.new_alias(), &versions.new, true)?,
        ];
        let known = [
            coverage_column(&versions.base_alias()).to_ascii_lowercase(),
            coverage_column(&versions.new_alias()).to_ascii_lowercase(),
        ];
        for name in column_names_lower(df) {
            if known.contains(&name) {
                continue;
            }
            if let Some(alias) = name.strip_prefix("cov_") {
                metrics.push(read_metric(df, alias, alias, false)?);
            }
        }
        Ok(Self { metrics })
    }

    pub fn metric(&self, label: &str) -> Option<&KpiMetric> {
        self.metrics.iter().find(|m| m.label == label)
    }
}

fn read_metric(df: &DataFrame, alias: &str, label: &str, required: bool) -> Result<KpiMetric> {
    let coverage_name = coverage_column(alias);
    let profiles_name = profiles_column(alias);
    let coverage = find_column(df, &coverage_name)
        .ok_or_else(|| ReportError::missing(&coverage_name))?;
    let profiles = match find_column(df, &profiles_name) {
        Some(column) => cell_f64(column, 0),
        None if required => return Err(ReportError::missing(profiles_name)),
        None => 0.0,
    };
    Ok(KpiMetric {
        label: label.to_string(),
        coverage: cell_f64(coverage, 0),
        profiles,
    })
}

/// Read a comparison (or Top-N comparison) table.
///
/// Columns are `FIELD_VALUE`, the base and new counts, then every other
/// `CNT_*` column as an extra source labelled by its alias.
pub fn comparison_from_frame(df: &DataFrame, versions: &VersionPair) -> Result<ComparisonTable> {
    let value_column =
        find_column(df, FIELD_VALUE_COLUMN).ok_or_else(|| ReportError::missing(FIELD_VALUE_COLUMN))?;

    let mut columns = vec![
        VersionColumn::new(
            count_column(&versions.base_alias()).to_ascii_lowercase(),
            versions.base.clone(),
        ),
        VersionColumn::new(
            count_column(&versions.new_alias()).to_ascii_lowercase(),
            versions.new.clone(),
        ),
    ];
    for name in column_names_lower(df) {
        if columns.iter().any(|c| c.column == name) {
            continue;
        }
        if let Some(alias) = name.strip_prefix("cnt_") {
            let label = alias.to_string();
            columns.push(VersionColumn::new(name, label));
        }
    }

    let sources = columns
        .iter()
        .map(|c| find_column(df, &c.column).ok_or_else(|| ReportError::missing(c.column.clone())))
        .collect::<Result<Vec<&Column>>>()?;

    let rows = (0..df.height())
        .map(|idx| ComparisonRow {
            value: cell_string(value_column, idx),
            values: sources.iter().map(|column| cell_f64(column, idx)).collect(),
        })
        .collect();
    Ok(ComparisonTable { columns, rows })
}

/// Numeric cell; nulls and unparsable values count as 0.
pub(crate) fn cell_f64(column: &Column, idx: usize) -> f64 {
    column.get(idx).ok().and_then(any_to_f64).unwrap_or(0.0)
}

pub(crate) fn cell_string(column: &Column, idx: usize) -> Option<String> {
    match column.get(idx) {
        Ok(AnyValue::Null) | Err(_) => None,
        Ok(value) => Some(any_to_string(value)),
    }
}
