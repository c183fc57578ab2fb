//! Warehouse naming conventions.
//!
//! The generator and the reader never talk to each other; the reader finds the
//! generator's output purely by rebuilding the names below. Both sides must go
//! through these functions.

use std::fmt;

use crate::topic::{Field, Topic};

/// Column holding the compared value in comparison tables.
pub const FIELD_VALUE_COLUMN: &str = "FIELD_VALUE";

/// Normalize free text into a warehouse identifier fragment.
///
/// Upper-cases, turns spaces and hyphens into underscores, drops apostrophes and
/// replaces anything else outside `[A-Z0-9_]` with an underscore.
///
/// # Examples
///
/// ```
/// use kpi_model::naming::clean_name;
///
/// assert_eq!(clean_name("United States"), "UNITED_STATES");
/// assert_eq!(clean_name("Bachelor's Degree"), "BACHELORS_DEGREE");
/// assert_eq!(clean_name("v5-OCT25"), "V5_OCT25");
/// ```
pub fn clean_name(value: &str) -> String {
    value
        .chars()
        .filter(|ch| *ch != '\'')
        .map(|ch| match ch {
            ' ' | '-' => '_',
            ch if ch.is_ascii_alphanumeric() => ch.to_ascii_uppercase(),
            _ => '_',
        })
        .collect()
}

/// Lower-case alias of a version label used inside column names.
///
/// # Examples
///
/// ```
/// use kpi_model::naming::version_alias;
///
/// assert_eq!(version_alias("v5_OCT25"), "v5_oct25");
/// assert_eq!(version_alias("BLS 2023"), "bls_2023");
/// ```
pub fn version_alias(version: &str) -> String {
    clean_name(version).to_ascii_lowercase()
}

/// Schema holding the comparison tables of one base/new version pair.
pub fn comparison_schema(base_version: &str, new_version: &str) -> String {
    format!(
        "PDL_RELEASE_COMPARISONS_{}_{}",
        clean_name(base_version),
        clean_name(new_version)
    )
}

/// Count column for a version or benchmark alias.
pub fn count_column(alias: &str) -> String {
    format!("CNT_{}", alias.to_ascii_uppercase())
}

/// Share-of-total column for a version or benchmark alias.
pub fn pct_column(alias: &str) -> String {
    format!("PCT_{}", alias.to_ascii_uppercase())
}

/// Coverage column in KPI tables.
pub fn coverage_column(alias: &str) -> String {
    format!("COV_{}", alias.to_ascii_uppercase())
}

/// Profile count column in KPI tables.
pub fn profiles_column(alias: &str) -> String {
    format!("PROFILES_{}", alias.to_ascii_uppercase())
}

/// The three generated table families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TableKind {
    /// Coverage and profile counts.
    Kpi,
    /// Per-value counts for both versions.
    Comparison,
    /// Top-N values ranked by the benchmark.
    BenchmarkComparison,
}

impl TableKind {
    pub const ALL: [TableKind; 3] = [
        TableKind::Kpi,
        TableKind::Comparison,
        TableKind::BenchmarkComparison,
    ];

    pub fn prefix(&self) -> &'static str {
        match self {
            TableKind::Kpi => "KPI",
            TableKind::Comparison => "COMP",
            TableKind::BenchmarkComparison => "COMPLC",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TableKind::Kpi => "kpi",
            TableKind::Comparison => "comparison",
            TableKind::BenchmarkComparison => "top-n comparison",
        }
    }

    /// Table name for a typed topic/field pair.
    pub fn table_name(&self, topic: Topic, field: Field, country: Option<&str>) -> String {
        make_table_name(*self, topic.as_str(), field.column_name(), country)
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Build `<PREFIX>_<TOPIC>_<FIELD>[_<COUNTRY>]` from free-text parts.
pub fn make_table_name(kind: TableKind, topic: &str, field: &str, country: Option<&str>) -> String {
    let mut name = format!(
        "{}_{}_{}",
        kind.prefix(),
        clean_name(topic),
        clean_name(field)
    );
    if let Some(country) = country {
        name.push('_');
        name.push_str(&clean_name(country));
    }
    name
}

/// `DATABASE.SCHEMA.TABLE` path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedName {
    pub database: String,
    pub schema: String,
    pub table: String,
}

impl QualifiedName {
    pub fn new(
        database: impl Into<String>,
        schema: impl Into<String>,
        table: impl Into<String>,
    ) -> Self {
        Self {
            database: database.into(),
            schema: schema.into(),
            table: table.into(),
        }
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.database, self.schema, self.table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_name_replaces_other_punctuation() {
        assert_eq!(clean_name("Hong Kong"), "HONG_KONG");
        assert_eq!(clean_name("A/B (C)"), "A_B__C_");
    }

    #[test]
    fn country_suffix_is_optional() {
        assert_eq!(
            make_table_name(TableKind::Comparison, "education", "BGI_DEGREE", None),
            "COMP_EDUCATION_BGI_DEGREE"
        );
        assert_eq!(
            TableKind::BenchmarkComparison.table_name(
                Topic::Education,
                Field::BgiDegree,
                Some("New Zealand")
            ),
            "COMPLC_EDUCATION_BGI_DEGREE_NEW_ZEALAND"
        );
    }

    #[test]
    fn schema_uses_both_versions() {
        assert_eq!(
            comparison_schema("v5_OCT25", "v5_JAN26"),
            "PDL_RELEASE_COMPARISONS_V5_OCT25_V5_JAN26"
        );
    }
}
