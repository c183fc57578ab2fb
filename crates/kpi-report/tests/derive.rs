//! Properties of the comparison derivations.

use kpi_report::{
    ComparisonRow, ComparisonTable, NULL_LABEL, VersionColumn, change_rows, compute_percentages,
    rank_by_abs_change, reshape_wide_to_long,
};
use proptest::prelude::*;

fn columns(n: usize) -> Vec<VersionColumn> {
    (0..n)
        .map(|i| VersionColumn::new(format!("cnt_v{i}"), format!("v{i}")))
        .collect()
}

fn table_strategy() -> impl Strategy<Value = ComparisonTable> {
    (2usize..=3).prop_flat_map(|width| {
        prop::collection::vec(
            (
                prop::option::of("[A-Za-z' ]{1,12}"),
                prop::collection::vec(0u32..10_000, width),
            ),
            1..40,
        )
        .prop_map(move |rows| ComparisonTable {
            columns: columns(width),
            rows: rows
                .into_iter()
                .map(|(value, counts)| ComparisonRow {
                    value,
                    values: counts.into_iter().map(f64::from).collect(),
                })
                .collect(),
        })
    })
}

proptest! {
    #[test]
    fn percentages_sum_to_one(table in table_strategy()) {
        let pct = compute_percentages(&table);
        for idx in 0..table.columns.len() {
            let total = table.column_total(idx);
            let sum = pct.column_total(idx);
            if total > 0.0 {
                prop_assert!((sum - 1.0).abs() < 1e-9, "column {idx} sums to {sum}");
            } else {
                prop_assert_eq!(sum, 0.0);
            }
        }
    }

    #[test]
    fn reshape_emits_one_row_per_cell(table in table_strategy()) {
        let long = reshape_wide_to_long(&table);
        prop_assert_eq!(long.len(), table.rows.len() * table.columns.len());
        let nulls = table.rows.iter().filter(|r| r.value.is_none()).count();
        let null_cells = long.iter().filter(|r| r.category == NULL_LABEL).count();
        prop_assert!(null_cells >= nulls * table.columns.len());
    }

    #[test]
    fn largest_changes_are_defined_and_sorted(table in table_strategy(), n in 1usize..30) {
        let ranked = rank_by_abs_change(change_rows(&table, 0, 1), n);
        prop_assert!(ranked.len() <= n);
        prop_assert!(ranked.iter().all(|r| r.base != 0.0 && r.pct_change.is_some()));
        for pair in ranked.windows(2) {
            let a = pair[0].pct_change.unwrap_or_default().abs();
            let b = pair[1].pct_change.unwrap_or_default().abs();
            prop_assert!(a >= b);
        }
    }
}

#[test]
fn new_category_from_zero_is_not_a_change() {
    let table = ComparisonTable {
        columns: columns(2),
        rows: vec![
            ComparisonRow {
                value: Some("Bachelor's Degree".to_string()),
                values: vec![100.0, 120.0],
            },
            ComparisonRow {
                value: Some("Certificate".to_string()),
                values: vec![0.0, 10.0],
            },
        ],
    };
    let ranked = rank_by_abs_change(change_rows(&table, 0, 1), 20);
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].category, "Bachelor's Degree");
    assert!((ranked[0].pct_change.unwrap() - 0.2).abs() < 1e-12);
}
