//! Long-form CSV export of dashboard panels.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use polars::prelude::*;
use tracing::info;

use crate::derive::{ChangeRow, LongRow, reshape_wide_to_long};
use crate::error::{ReportError, Result};
use crate::panel::Dashboard;

/// Frame with `field_value`, `version` and a `value_name` column.
pub fn long_frame(rows: &[LongRow], value_name: &str) -> Result<DataFrame> {
    let categories: Vec<&str> = rows.iter().map(|r| r.category.as_str()).collect();
    let versions: Vec<&str> = rows.iter().map(|r| r.version.as_str()).collect();
    let values: Vec<f64> = rows.iter().map(|r| r.value).collect();
    Ok(DataFrame::new(vec![
        Series::new("field_value".into(), categories).into_column(),
        Series::new("version".into(), versions).into_column(),
        Series::new(value_name.into(), values).into_column(),
    ])?)
}

pub fn changes_frame(rows: &[ChangeRow]) -> Result<DataFrame> {
    let categories: Vec<&str> = rows.iter().map(|r| r.category.as_str()).collect();
    let base: Vec<f64> = rows.iter().map(|r| r.base).collect();
    let new: Vec<f64> = rows.iter().map(|r| r.new).collect();
    let change: Vec<Option<f64>> = rows.iter().map(|r| r.pct_change).collect();
    Ok(DataFrame::new(vec![
        Series::new("field_value".into(), categories).into_column(),
        Series::new("base".into(), base).into_column(),
        Series::new("new".into(), new).into_column(),
        Series::new("pct_change".into(), change).into_column(),
    ])?)
}

pub fn write_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    let mut file = File::create(path).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    CsvWriter::new(&mut file).include_header(true).finish(df)?;
    Ok(())
}

/// Write every loaded panel as long-form CSV files under `dir`.
///
/// Per comparison table: `<TABLE>_counts.csv`, `<TABLE>_percentages.csv` and
/// `<TABLE>_changes.csv`; the benchmark view as `<TABLE>.csv`. Panels that
/// failed to load are skipped.
pub fn export_dashboard(dashboard: &Dashboard, dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).map_err(|source| ReportError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut written = Vec::new();
    for panel in &dashboard.panels {
        let Ok(Some(view)) = &panel.comparison else {
            continue;
        };
        let stem = &panel.comparison_table.table;
        let outputs = [
            (
                format!("{stem}_counts.csv"),
                long_frame(&reshape_wide_to_long(&view.top_counts), "count")?,
            ),
            (
                format!("{stem}_percentages.csv"),
                long_frame(&reshape_wide_to_long(&view.top_percentages), "pct")?,
            ),
            (
                format!("{stem}_changes.csv"),
                changes_frame(&view.largest_changes)?,
            ),
        ];
        for (name, mut df) in outputs {
            let path = dir.join(name);
            write_csv(&mut df, &path)?;
            written.push(path);
        }
    }
    if let Some(panel) = &dashboard.benchmark
        && let Ok(Some(table)) = &panel.table
    {
        let path = dir.join(format!("{}.csv", panel.table_name.table));
        let mut df = long_frame(&reshape_wide_to_long(table), "pct")?;
        write_csv(&mut df, &path)?;
        written.push(path);
    }
    info!(files = written.len(), dir = %dir.display(), "exported panels");
    Ok(written)
}
