//! Topic-level benchmark views built outside the generator.

use kpi_common::find_column;
use kpi_model::{Topic, VersionPair};
use polars::prelude::DataFrame;

use crate::derive::{ComparisonRow, ComparisonTable, VersionColumn, rank_top_n};
use crate::error::{ReportError, Result};
use crate::table::{cell_f64, cell_string};

/// A benchmark table shown beneath a topic's field panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BenchmarkView {
    /// SOC-2 shares against OEWS and ACS employment.
    RolesOewsAcs,
    /// Industry shares against BLS 2023 employment.
    EmployersIndustryBls,
}

impl BenchmarkView {
    pub fn for_topic(topic: Topic) -> Option<Self> {
        match topic {
            Topic::Roles => Some(Self::RolesOewsAcs),
            Topic::Employers => Some(Self::EmployersIndustryBls),
            Topic::Education | Topic::Location => None,
        }
    }

    pub fn table_name(self) -> &'static str {
        match self {
            Self::RolesOewsAcs => "ROLES_BENCHMARK_OEWS_ACS",
            Self::EmployersIndustryBls => "EMPLOYERS_INDUSTRY_BLS",
        }
    }

    pub fn top_n(self) -> usize {
        match self {
            Self::RolesOewsAcs => 25,
            Self::EmployersIndustryBls => 20,
        }
    }

    pub fn title(self, versions: &VersionPair) -> String {
        match self {
            Self::RolesOewsAcs => format!(
                "SOC-2 Employment Share: {} vs {} vs OEWS vs ACS",
                versions.new, versions.base
            ),
            Self::EmployersIndustryBls => "Industry Distribution vs BLS, Year = 2023".to_string(),
        }
    }

    fn label_column(self) -> &'static str {
        match self {
            Self::RolesOewsAcs => "bgi_soc2_name",
            Self::EmployersIndustryBls => "industry",
        }
    }

    /// Stored values are percentages for roles and fractions for employers.
    fn divisor(self) -> f64 {
        match self {
            Self::RolesOewsAcs => 100.0,
            Self::EmployersIndustryBls => 1.0,
        }
    }

    /// Value columns, new version first.
    pub fn columns(self, versions: &VersionPair) -> Vec<VersionColumn> {
        let (prefix, extra): (&str, &[(&str, &str)]) = match self {
            Self::RolesOewsAcs => (
                "pct",
                &[("oews_emp_share", "OEWS"), ("acs_emp_share", "ACS")],
            ),
            Self::EmployersIndustryBls => ("perc", &[("perc_bls", "BLS 2023")]),
        };
        let mut columns = vec![
            VersionColumn::new(
                format!("{prefix}_{}", versions.new_alias()),
                versions.new.clone(),
            ),
            VersionColumn::new(
                format!("{prefix}_{}", versions.base_alias()),
                versions.base.clone(),
            ),
        ];
        columns.extend(
            extra
                .iter()
                .map(|(column, label)| VersionColumn::new(*column, *label)),
        );
        columns
    }

    /// Read the view as fractions, top rows by the new version's share.
    pub fn read(self, df: &DataFrame, versions: &VersionPair) -> Result<ComparisonTable> {
        let label = find_column(df, self.label_column())
            .ok_or_else(|| ReportError::missing(self.label_column()))?;
        let columns = self.columns(versions);
        let sources = columns
            .iter()
            .map(|c| {
                find_column(df, &c.column).ok_or_else(|| ReportError::missing(c.column.clone()))
            })
            .collect::<Result<Vec<_>>>()?;
        let divisor = self.divisor();
        let rows: Vec<ComparisonRow> = (0..df.height())
            .map(|idx| ComparisonRow {
                value: cell_string(label, idx),
                values: sources
                    .iter()
                    .map(|column| cell_f64(column, idx) / divisor)
                    .collect(),
            })
            .collect();
        let rows = rank_top_n(rows, self.top_n(), |row| row.values[0]);
        Ok(ComparisonTable { columns, rows })
    }
}

#[cfg(test)]
mod tests {
    use polars::prelude::{IntoColumn, NamedFrom, Series};

    use super::*;

    #[test]
    fn roles_view_scales_percentages() {
        let df = DataFrame::new(vec![
            Series::new("BGI_SOC2_NAME".into(), &["Management", "Sales"]).into_column(),
            Series::new("PCT_V5_OCT25".into(), &[10.0, 30.0]).into_column(),
            Series::new("PCT_V5_JAN26".into(), &[12.0, 28.0]).into_column(),
            Series::new("OEWS_EMP_SHARE".into(), &[6.0, 9.5]).into_column(),
            Series::new("ACS_EMP_SHARE".into(), &[8.0, 10.0]).into_column(),
        ])
        .unwrap();
        let table = BenchmarkView::RolesOewsAcs
            .read(&df, &VersionPair::default())
            .unwrap();
        assert_eq!(table.columns[0].label, "v5_JAN26");
        assert_eq!(table.columns[3].label, "ACS");
        assert_eq!(table.rows[0].category(), "Sales");
        assert_eq!(table.rows[0].values, vec![0.28, 0.3, 0.095, 0.1]);
    }

    #[test]
    fn employers_view_keeps_fractions_and_top_20() {
        let names: Vec<String> = (0..30).map(|i| format!("Industry {i}")).collect();
        let shares: Vec<f64> = (0..30).map(|i| f64::from(i) / 100.0).collect();
        let df = DataFrame::new(vec![
            Series::new("INDUSTRY".into(), names).into_column(),
            Series::new("PERC_BLS".into(), shares.clone()).into_column(),
            Series::new("PERC_V5_OCT25".into(), shares.clone()).into_column(),
            Series::new("PERC_V5_JAN26".into(), shares).into_column(),
        ])
        .unwrap();
        let table = BenchmarkView::EmployersIndustryBls
            .read(&df, &VersionPair::default())
            .unwrap();
        assert_eq!(table.rows.len(), 20);
        assert_eq!(table.rows[0].category(), "Industry 29");
        assert_eq!(table.rows[0].values[2], 0.29);
    }

    #[test]
    fn missing_label_column_is_reported() {
        let df = DataFrame::new(vec![Series::new("X".into(), &[1.0]).into_column()]).unwrap();
        let err = BenchmarkView::RolesOewsAcs
            .read(&df, &VersionPair::default())
            .unwrap_err();
        assert!(err.to_string().contains("bgi_soc2_name"));
    }
}
