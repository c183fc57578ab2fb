//! The three query shapes behind the generated tables.
//!
//! All queries start from one CTE per source (`src_base`, `src_new`, optional
//! `src_lc`) that projects the identifier and the extracted value under fixed
//! aliases, so the rest of the query never sees per-field expressions.

use std::fmt::Write;

use kpi_model::naming::{
    FIELD_VALUE_COLUMN, count_column, coverage_column, pct_column, profiles_column,
};
use kpi_model::{FieldMapping, SourceExpr, VersionPair};

use crate::error::{Result, SqlError};
use crate::filter::{ID, SourceFilter, VALUE};

/// Which source's count ranks a Top-N comparison.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RankSource {
    Base,
    New,
    #[default]
    Benchmark,
}

/// Top-N restriction for [`generate_top_n_comparison_query`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopN {
    pub n: usize,
    pub rank_by: RankSource,
}

impl TopN {
    pub fn new(n: usize) -> Self {
        Self {
            n,
            rank_by: RankSource::Benchmark,
        }
    }

    #[must_use]
    pub fn ranked_by(mut self, rank_by: RankSource) -> Self {
        self.rank_by = rank_by;
        self
    }
}

/// A source taking part in one query: CTE suffix, column alias, expression.
struct Part<'a> {
    suffix: &'static str,
    alias: String,
    source: &'a SourceExpr,
}

fn parts<'a>(mapping: &'a FieldMapping, versions: &VersionPair) -> Vec<Part<'a>> {
    let mut parts = vec![
        Part {
            suffix: "base",
            alias: versions.base_alias(),
            source: &mapping.base,
        },
        Part {
            suffix: "new",
            alias: versions.new_alias(),
            source: &mapping.new,
        },
    ];
    if let Some(benchmark) = &mapping.benchmark {
        parts.push(Part {
            suffix: "lc",
            alias: benchmark.alias.clone(),
            source: &benchmark.source,
        });
    }
    parts
}

fn write_source_ctes(sql: &mut String, parts: &[Part<'_>], filter: &SourceFilter<'_>) {
    sql.push_str("WITH ");
    for (idx, part) in parts.iter().enumerate() {
        if idx > 0 {
            sql.push_str(",\n");
        }
        let _ = writeln!(sql, "src_{} AS (", part.suffix);
        let _ = writeln!(
            sql,
            "    SELECT {} AS {ID}, {} AS {VALUE}",
            part.source.id_col, part.source.expr
        );
        let _ = write!(sql, "    FROM {}", part.source.from);
        if let Some(predicate) = filter.source_predicate(part.source) {
            let _ = write!(sql, "\n    WHERE {predicate}");
        }
        sql.push_str("\n)");
    }
}

fn write_count_ctes(sql: &mut String, parts: &[Part<'_>], valid: &str) {
    for part in parts {
        let _ = write!(
            sql,
            ",\ncnt_{s} AS (\n    SELECT {VALUE}, COUNT(DISTINCT {ID}) AS CNT\n    FROM src_{s}\n    WHERE {valid}\n    GROUP BY {VALUE}\n)",
            s = part.suffix
        );
    }
}

/// Coverage and profile counts for each version (and the benchmark when one
/// is configured). Always a single row.
///
/// Coverage is `profiles / distinct ids`, 0 when a source has no identifiers.
pub fn generate_kpi_query(
    mapping: &FieldMapping,
    versions: &VersionPair,
    filter: &SourceFilter<'_>,
) -> String {
    let parts = parts(mapping, versions);
    let valid = filter.value_predicate();
    let mut sql = String::new();
    write_source_ctes(&mut sql, &parts, filter);
    for part in &parts {
        let _ = write!(
            sql,
            ",\nkpi_{s} AS (\n    SELECT\n        COUNT(DISTINCT CASE WHEN {valid} THEN {ID} END) AS PROFILES,\n        COUNT(DISTINCT {ID}) AS TOTAL\n    FROM src_{s}\n)",
            s = part.suffix
        );
    }

    let mut columns = Vec::with_capacity(parts.len() * 2);
    for part in &parts {
        columns.push(format!(
            "COALESCE(CAST(kpi_{s}.PROFILES AS DOUBLE) / NULLIF(kpi_{s}.TOTAL, 0), 0) AS {}",
            coverage_column(&part.alias),
            s = part.suffix
        ));
    }
    for part in &parts {
        columns.push(format!(
            "kpi_{}.PROFILES AS {}",
            part.suffix,
            profiles_column(&part.alias)
        ));
    }
    let _ = write!(sql, "\nSELECT\n    {}\nFROM kpi_base", columns.join(",\n    "));
    for part in parts.iter().skip(1) {
        let _ = write!(sql, "\nCROSS JOIN kpi_{}", part.suffix);
    }
    sql
}

/// Per-value counts for both versions.
///
/// Values from either version appear once (full outer join, missing side 0).
/// The benchmark count, when configured, is attached to that value set with a
/// left join so it never adds rows. No ordering is applied.
pub fn generate_comparison_query(
    mapping: &FieldMapping,
    versions: &VersionPair,
    filter: &SourceFilter<'_>,
) -> String {
    let parts = parts(mapping, versions);
    let valid = filter.value_predicate();
    let mut sql = String::new();
    write_source_ctes(&mut sql, &parts, filter);
    write_count_ctes(&mut sql, &parts, &valid);

    let base = count_column(&parts[0].alias);
    let new = count_column(&parts[1].alias);
    let _ = write!(
        sql,
        ",\nmerged AS (\n    SELECT\n        COALESCE(cnt_base.{VALUE}, cnt_new.{VALUE}) AS {VALUE},\n        COALESCE(cnt_base.CNT, 0) AS {base},\n        COALESCE(cnt_new.CNT, 0) AS {new}\n    FROM cnt_base\n    FULL OUTER JOIN cnt_new ON cnt_base.{VALUE} = cnt_new.{VALUE}\n)"
    );

    let mut columns = vec![
        format!("merged.{VALUE} AS {FIELD_VALUE_COLUMN}"),
        format!("merged.{base}"),
        format!("merged.{new}"),
    ];
    let benchmark = parts.get(2);
    if let Some(part) = benchmark {
        columns.push(format!(
            "COALESCE(cnt_lc.CNT, 0) AS {}",
            count_column(&part.alias)
        ));
    }
    let _ = write!(sql, "\nSELECT\n    {}\nFROM merged", columns.join(",\n    "));
    if benchmark.is_some() {
        let _ = write!(sql, "\nLEFT JOIN cnt_lc ON cnt_lc.{VALUE} = merged.{VALUE}");
    }
    sql
}

/// Per-value counts and shares restricted to the top `n` values of the
/// ranking source.
///
/// Ties rank by value ascending. Shares divide by each source's total over all
/// values, not only the top `n`, and fall back to 0 for empty sources.
pub fn generate_top_n_comparison_query(
    mapping: &FieldMapping,
    versions: &VersionPair,
    filter: &SourceFilter<'_>,
    top_n: TopN,
) -> Result<String> {
    if top_n.n == 0 {
        return Err(SqlError::EmptyTopN);
    }
    let parts = parts(mapping, versions);
    let rank_suffix = match top_n.rank_by {
        RankSource::Base => "base",
        RankSource::New => "new",
        RankSource::Benchmark if mapping.benchmark.is_some() => "lc",
        RankSource::Benchmark => {
            return Err(SqlError::MissingBenchmark {
                topic: mapping.topic,
                field: mapping.field,
            });
        }
    };
    let valid = filter.value_predicate();
    let mut sql = String::new();
    write_source_ctes(&mut sql, &parts, filter);
    write_count_ctes(&mut sql, &parts, &valid);

    let _ = write!(
        sql,
        ",\nranked AS (\n    SELECT {VALUE}, CNT\n    FROM cnt_{rank_suffix}\n    ORDER BY CNT DESC, {VALUE} ASC\n    LIMIT {}\n)",
        top_n.n
    );
    let totals: Vec<String> = parts
        .iter()
        .map(|part| {
            format!(
                "(SELECT SUM(CNT) FROM cnt_{s}) AS TOTAL_{s}",
                s = part.suffix
            )
        })
        .collect();
    let _ = write!(
        sql,
        ",\ntotals AS (\n    SELECT\n        {}\n)",
        totals.join(",\n        ")
    );

    let mut columns = vec![format!("ranked.{VALUE} AS {FIELD_VALUE_COLUMN}")];
    for part in &parts {
        let count = format!("COALESCE(cnt_{}.CNT, 0)", part.suffix);
        columns.push(format!("{count} AS {}", count_column(&part.alias)));
        columns.push(format!(
            "COALESCE(CAST({count} AS DOUBLE) / NULLIF(totals.TOTAL_{s}, 0), 0) AS {}",
            pct_column(&part.alias),
            s = part.suffix
        ));
    }
    let _ = write!(
        sql,
        "\nSELECT\n    {}\nFROM ranked\nCROSS JOIN totals",
        columns.join(",\n    ")
    );
    for part in &parts {
        let _ = write!(
            sql,
            "\nLEFT JOIN cnt_{s} ON cnt_{s}.{VALUE} = ranked.{VALUE}",
            s = part.suffix
        );
    }
    Ok(sql)
}

/// Wrap a query so the warehouse replaces the named table with its result.
pub fn create_or_replace(table: &str, query: &str) -> String {
    format!("CREATE OR REPLACE TABLE {table} AS\n{query}")
}
