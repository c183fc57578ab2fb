//! Number formatting for report output.

/// Formats a floating-point number as a string without trailing zeros.
///
/// # Examples
///
/// ```
/// use kpi_common::format_numeric;
///
/// assert_eq!(format_numeric(1.0), "1");
/// assert_eq!(format_numeric(1.50), "1.5");
/// assert_eq!(format_numeric(0.0), "0");
/// ```
pub fn format_numeric(v: f64) -> String {
    let s = format!("{v}");
    if !s.contains('.') {
        return s;
    }
    let trimmed = s.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Formats a fraction as a percentage with one decimal (`0.1234` -> `12.3%`).
///
/// # Examples
///
/// ```
/// use kpi_common::format_percent;
///
/// assert_eq!(format_percent(0.1234), "12.3%");
/// assert_eq!(format_percent(-0.5), "-50.0%");
/// ```
pub fn format_percent(fraction: f64) -> String {
    format!("{:.1}%", fraction * 100.0)
}

/// Formats a count with thousands separators (`1234567` -> `1,234,567`).
///
/// # Examples
///
/// ```
/// use kpi_common::format_count;
///
/// assert_eq!(format_count(1_234_567.0), "1,234,567");
/// assert_eq!(format_count(12.0), "12");
/// ```
pub fn format_count(value: f64) -> String {
    let rounded = value.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0 {
        out.push('-');
    }
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_numeric_keeps_integers() {
        assert_eq!(format_numeric(100.0), "100");
        assert_eq!(format_numeric(2.25), "2.25");
    }

    #[test]
    fn test_format_count_negative() {
        assert_eq!(format_count(-1_000.0), "-1,000");
        assert_eq!(format_count(999.0), "999");
    }
}
