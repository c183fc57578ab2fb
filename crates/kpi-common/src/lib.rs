//! Shared utilities for the KPI crates.
//!
//! Polars `AnyValue` conversions used when warehouse result sets are turned into
//! typed rows, plus the number formatting used by report tables.

pub mod format;
pub mod frame;

pub use format::{format_count, format_numeric, format_percent};
pub use frame::{any_to_f64, any_to_string, column_names_lower, find_column, parse_f64};
