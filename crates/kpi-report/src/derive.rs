//! Pure derivations over comparison tables: percentages, percent change,
//! rankings and the wide-to-long reshape used for charts and exports.

/// Category shown for a null field value.
pub const NULL_LABEL: &str = "<NULL>";

/// Canonical ordering of degree levels; other values follow in their
/// existing order.
pub const DEGREE_ORDER: [&str; 6] = [
    "High School",
    "Certificate",
    "Associate",
    "Bachelor's Degree",
    "Master's Degree",
    "Doctorate",
];

/// A value column of a comparison table and the label it is shown under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionColumn {
    /// Lower-cased column name, e.g. `cnt_v5_oct25`.
    pub column: String,
    /// Display label, e.g. `v5_OCT25`.
    pub label: String,
}

impl VersionColumn {
    pub fn new(column: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            label: label.into(),
        }
    }
}

/// One category with a value per [`VersionColumn`].
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonRow {
    pub value: Option<String>,
    pub values: Vec<f64>,
}

impl ComparisonRow {
    /// Display category; nulls use [`NULL_LABEL`].
    pub fn category(&self) -> &str {
        self.value.as_deref().unwrap_or(NULL_LABEL)
    }
}

/// Wide comparison table: categories by version columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComparisonTable {
    pub columns: Vec<VersionColumn>,
    pub rows: Vec<ComparisonRow>,
}

impl ComparisonTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.column.eq_ignore_ascii_case(column))
    }

    pub fn column_total(&self, idx: usize) -> f64 {
        self.rows
            .iter()
            .filter_map(|row| row.values.get(idx))
            .sum()
    }

    /// Same columns, different rows.
    #[must_use]
    pub fn with_rows(&self, rows: Vec<ComparisonRow>) -> Self {
        Self {
            columns: self.columns.clone(),
            rows,
        }
    }
}

/// One `(category, version, value)` observation.
#[derive(Debug, Clone, PartialEq)]
pub struct LongRow {
    pub category: String,
    pub version: String,
    pub value: f64,
}

/// Melt a wide table into one row per category and version column.
///
/// Rows are grouped by version column, categories keep table order.
pub fn reshape_wide_to_long(table: &ComparisonTable) -> Vec<LongRow> {
    let mut out = Vec::with_capacity(table.rows.len() * table.columns.len());
    for (idx, column) in table.columns.iter().enumerate() {
        for row in &table.rows {
            out.push(LongRow {
                category: row.category().to_string(),
                version: column.label.clone(),
                value: row.values.get(idx).copied().unwrap_or(0.0),
            });
        }
    }
    out
}

/// Divide every value by its column total; a zero total yields 0 everywhere.
///
/// `cnt_*` columns are renamed `pct_*`.
pub fn compute_percentages(table: &ComparisonTable) -> ComparisonTable {
    let totals: Vec<f64> = (0..table.columns.len())
        .map(|idx| table.column_total(idx))
        .collect();
    let columns = table
        .columns
        .iter()
        .map(|c| VersionColumn {
            column: match c.column.strip_prefix("cnt_") {
                Some(suffix) => format!("pct_{suffix}"),
                None => c.column.clone(),
            },
            label: c.label.clone(),
        })
        .collect();
    let rows = table
        .rows
        .iter()
        .map(|row| ComparisonRow {
            value: row.value.clone(),
            values: row
                .values
                .iter()
                .zip(&totals)
                .map(|(value, total)| if *total == 0.0 { 0.0 } else { value / total })
                .collect(),
        })
        .collect();
    ComparisonTable { columns, rows }
}

/// Relative change from `base` to `new`; `None` when `base` is 0.
///
/// # Examples
///
/// ```
/// use kpi_report::compute_pct_change;
///
/// assert_eq!(compute_pct_change(100.0, 150.0), Some(0.5));
/// assert_eq!(compute_pct_change(100.0, 50.0), Some(-0.5));
/// assert_eq!(compute_pct_change(0.0, 10.0), None);
/// ```
pub fn compute_pct_change(base: f64, new: f64) -> Option<f64> {
    if base == 0.0 {
        None
    } else {
        Some((new - base) / base)
    }
}

/// Base and new values of one category with their relative change.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeRow {
    pub category: String,
    pub base: f64,
    pub new: f64,
    pub pct_change: Option<f64>,
}

/// Pair two columns of a table into change rows.
pub fn change_rows(table: &ComparisonTable, base_idx: usize, new_idx: usize) -> Vec<ChangeRow> {
    table
        .rows
        .iter()
        .map(|row| {
            let base = row.values.get(base_idx).copied().unwrap_or(0.0);
            let new = row.values.get(new_idx).copied().unwrap_or(0.0);
            ChangeRow {
                category: row.category().to_string(),
                base,
                new,
                pct_change: compute_pct_change(base, new),
            }
        })
        .collect()
}

/// Keep the `n` rows with the largest key. Equal keys keep their input order.
pub fn rank_top_n<T>(mut rows: Vec<T>, n: usize, key: impl Fn(&T) -> f64) -> Vec<T> {
    rows.sort_by(|a, b| key(b).total_cmp(&key(a)));
    rows.truncate(n);
    rows
}

/// Keep the `n` rows with the largest absolute change, dropping undefined
/// changes.
pub fn rank_by_abs_change(rows: Vec<ChangeRow>, n: usize) -> Vec<ChangeRow> {
    let defined: Vec<ChangeRow> = rows
        .into_iter()
        .filter(|row| row.pct_change.is_some())
        .collect();
    rank_top_n(defined, n, |row| row.pct_change.map_or(0.0, f64::abs))
}

/// Move degree levels to the front in [`DEGREE_ORDER`].
pub fn order_by_degree(rows: Vec<ComparisonRow>) -> Vec<ComparisonRow> {
    let (mut degrees, rest): (Vec<_>, Vec<_>) = rows
        .into_iter()
        .partition(|row| DEGREE_ORDER.contains(&row.category()));
    degrees.sort_by_key(|row| {
        DEGREE_ORDER
            .iter()
            .position(|degree| *degree == row.category())
    });
    degrees.extend(rest);
    degrees
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(value: Option<&str>, values: &[f64]) -> ComparisonRow {
        ComparisonRow {
            value: value.map(String::from),
            values: values.to_vec(),
        }
    }

    fn table(rows: Vec<ComparisonRow>) -> ComparisonTable {
        ComparisonTable {
            columns: vec![
                VersionColumn::new("cnt_v5_oct25", "v5_OCT25"),
                VersionColumn::new("cnt_v5_jan26", "v5_JAN26"),
            ],
            rows,
        }
    }

    #[test]
    fn reshape_uses_null_label() {
        let long = reshape_wide_to_long(&table(vec![
            row(Some("Doctorate"), &[1.0, 2.0]),
            row(None, &[3.0, 4.0]),
        ]));
        assert_eq!(long.len(), 4);
        assert_eq!(long[1].category, NULL_LABEL);
        assert_eq!(long[1].version, "v5_OCT25");
        assert_eq!(long[3].value, 4.0);
    }

    #[test]
    fn percentages_with_zero_total() {
        let pct = compute_percentages(&table(vec![
            row(Some("a"), &[0.0, 1.0]),
            row(Some("b"), &[0.0, 3.0]),
        ]));
        assert_eq!(pct.columns[0].column, "pct_v5_oct25");
        assert_eq!(pct.rows[0].values, vec![0.0, 0.25]);
        assert_eq!(pct.rows[1].values, vec![0.0, 0.75]);
    }

    #[test]
    fn top_n_is_stable() {
        let rows = vec![("a", 2.0), ("b", 5.0), ("c", 2.0), ("d", 1.0)];
        let top = rank_top_n(rows, 3, |(_, v)| *v);
        assert_eq!(top, vec![("b", 5.0), ("a", 2.0), ("c", 2.0)]);
    }

    #[test]
    fn abs_change_ranks_negative_changes() {
        let changes = change_rows(
            &table(vec![
                row(Some("up"), &[100.0, 110.0]),
                row(Some("down"), &[100.0, 40.0]),
                row(Some("new"), &[0.0, 5.0]),
            ]),
            0,
            1,
        );
        let ranked = rank_by_abs_change(changes, 20);
        let names: Vec<&str> = ranked.iter().map(|r| r.category.as_str()).collect();
        assert_eq!(names, vec!["down", "up"]);
    }

    #[test]
    fn degree_levels_come_first_in_canonical_order() {
        let ordered = order_by_degree(vec![
            row(Some("Doctorate"), &[]),
            row(Some("Other"), &[]),
            row(Some("High School"), &[]),
            row(None, &[]),
            row(Some("Bachelor's Degree"), &[]),
        ]);
        let names: Vec<&str> = ordered.iter().map(ComparisonRow::category).collect();
        assert_eq!(
            names,
            vec!["High School", "Bachelor's Degree", "Doctorate", "Other", NULL_LABEL]
        );
    }
}
