//! Polars DataFrame and AnyValue helpers.
//!
//! Warehouse result sets arrive either typed (CSV snapshots) or as strings (SQL
//! API), so numeric extraction accepts both.

use polars::prelude::*;

use crate::format::format_numeric;

/// Display text of a cell. Nulls are empty and floats drop trailing zeros.
///
/// # Examples
///
/// ```
/// use polars::prelude::AnyValue;
/// use kpi_common::any_to_string;
///
/// assert_eq!(any_to_string(AnyValue::Null), "");
/// assert_eq!(any_to_string(AnyValue::Int32(42)), "42");
/// assert_eq!(any_to_string(AnyValue::String("Doctorate")), "Doctorate");
/// ```
pub fn any_to_string(value: AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        AnyValue::Float32(v) => format_numeric(f64::from(v)),
        AnyValue::Float64(v) => format_numeric(v),
        other => other.to_string(),
    }
}

/// Numeric value of a cell; strings are parsed, nulls and booleans are `None`.
pub fn any_to_f64(value: AnyValue<'_>) -> Option<f64> {
    match value {
        AnyValue::Null | AnyValue::Boolean(_) => None,
        AnyValue::String(s) => parse_f64(s),
        AnyValue::StringOwned(s) => parse_f64(&s),
        other => other.extract::<f64>(),
    }
}

/// `None` for blank or unparsable text.
pub fn parse_f64(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok()
}

/// Finds a column by name, ignoring ASCII case.
///
/// The warehouse upper-cases unquoted identifiers while CSV exports may not.
pub fn find_column<'a>(df: &'a DataFrame, name: &str) -> Option<&'a Column> {
    df.get_columns()
        .iter()
        .find(|column| column.name().as_str().eq_ignore_ascii_case(name))
}

/// Lower-cased column names, in frame order.
pub fn column_names_lower(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .map(|column| column.name().as_str().to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> DataFrame {
        DataFrame::new(vec![
            Series::new("FIELD_VALUE".into(), &["a", "b"]).into_column(),
            Series::new("CNT_V5_OCT25".into(), &[1i64, 2]).into_column(),
        ])
        .unwrap()
    }

    #[test]
    fn test_any_to_string_null() {
        assert_eq!(any_to_string(AnyValue::Null), "");
    }

    #[test]
    fn test_any_to_string_floats() {
        assert_eq!(any_to_string(AnyValue::Float64(1.5)), "1.5");
        assert_eq!(any_to_string(AnyValue::Float64(1.0)), "1");
    }

    #[test]
    fn test_any_to_f64() {
        assert_eq!(any_to_f64(AnyValue::Null), None);
        assert_eq!(any_to_f64(AnyValue::Int64(42)), Some(42.0));
        assert_eq!(any_to_f64(AnyValue::String("0.25")), Some(0.25));
        assert_eq!(any_to_f64(AnyValue::String("n/a")), None);
    }

    #[test]
    fn test_parse_f64() {
        assert_eq!(parse_f64(""), None);
        assert_eq!(parse_f64("  3.5  "), Some(3.5));
    }

    #[test]
    fn test_find_column_ignores_case() {
        let df = frame();
        assert!(find_column(&df, "cnt_v5_oct25").is_some());
        assert!(find_column(&df, "cnt_v5_jan26").is_none());
    }

    #[test]
    fn test_column_names_lower() {
        assert_eq!(
            column_names_lower(&frame()),
            vec!["field_value".to_string(), "cnt_v5_oct25".to_string()]
        );
    }
}
