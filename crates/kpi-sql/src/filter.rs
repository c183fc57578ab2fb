//! Row filters shared by every generated query.

use kpi_model::SourceExpr;

/// Column alias of the extracted value inside source CTEs.
pub(crate) const VALUE: &str = "FIELD_VALUE";
/// Column alias of the identifier inside source CTEs.
pub(crate) const ID: &str = "ID";

/// Filters applied to every source of one generated table.
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceFilter<'a> {
    /// Case-insensitive patterns removed from counts.
    pub exclude_values: &'a [String],
    /// Additional predicate, inserted verbatim.
    pub extra_where: Option<&'a str>,
    /// Restrict each source to one country.
    pub country: Option<&'a str>,
}

impl<'a> SourceFilter<'a> {
    pub fn new(exclude_values: &'a [String]) -> Self {
        Self {
            exclude_values,
            extra_where: None,
            country: None,
        }
    }

    #[must_use]
    pub fn with_extra_where(mut self, predicate: Option<&'a str>) -> Self {
        self.extra_where = predicate.filter(|p| !p.trim().is_empty());
        self
    }

    #[must_use]
    pub fn with_country(mut self, country: Option<&'a str>) -> Self {
        self.country = country;
        self
    }

    /// Row-level predicate for a source table (before value extraction).
    pub(crate) fn source_predicate(&self, source: &SourceExpr) -> Option<String> {
        let mut parts = Vec::new();
        if let Some(predicate) = self.extra_where {
            parts.push(format!("({})", predicate.trim()));
        }
        if let Some(country) = self.country {
            parts.push(format!("{} = {}", source.country_col, quote_literal(country)));
        }
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" AND "))
        }
    }

    /// Predicate selecting countable values: not null and not excluded.
    pub(crate) fn value_predicate(&self) -> String {
        let mut parts = vec![format!("{VALUE} IS NOT NULL")];
        parts.extend(
            self.exclude_values
                .iter()
                .filter(|pattern| !pattern.trim().is_empty())
                .map(|pattern| format!("{VALUE} NOT ILIKE {}", quote_literal(&ilike_pattern(pattern)))),
        );
        parts.join(" AND ")
    }
}

/// Quote a string literal, doubling embedded single quotes.
///
/// # Examples
///
/// ```
/// use kpi_sql::quote_literal;
///
/// assert_eq!(quote_literal("Côte d'Ivoire"), "'Côte d''Ivoire'");
/// ```
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Exclusion patterns without an explicit `%` match as substrings.
pub(crate) fn ilike_pattern(pattern: &str) -> String {
    let trimmed = pattern.trim();
    if trimmed.contains('%') {
        trimmed.to_string()
    } else {
        format!("%{trimmed}%")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> SourceExpr {
        SourceExpr {
            expr: "BGI_DEGREE".to_string(),
            from: "pdl_clean.v5_OCT25.education".to_string(),
            id_col: "PERSON_ID".to_string(),
            country_col: "BGI_COUNTRY".to_string(),
        }
    }

    #[test]
    fn empty_filter_has_no_source_predicate() {
        assert_eq!(SourceFilter::default().source_predicate(&source()), None);
        assert_eq!(
            SourceFilter::default().value_predicate(),
            "FIELD_VALUE IS NOT NULL"
        );
    }

    #[test]
    fn exclusions_become_substring_ilike() {
        let exclude = vec!["unknown".to_string(), "n/a%".to_string(), " ".to_string()];
        assert_eq!(
            SourceFilter::new(&exclude).value_predicate(),
            "FIELD_VALUE IS NOT NULL AND FIELD_VALUE NOT ILIKE '%unknown%' \
             AND FIELD_VALUE NOT ILIKE 'n/a%'"
        );
    }

    #[test]
    fn country_and_extra_where_combine() {
        let filter = SourceFilter::default()
            .with_extra_where(Some("BGI_NAICS4 <> '5613'"))
            .with_country(Some("People's Republic"));
        assert_eq!(
            filter.source_predicate(&source()).unwrap(),
            "(BGI_NAICS4 <> '5613') AND BGI_COUNTRY = 'People''s Republic'"
        );
    }

    #[test]
    fn blank_extra_where_is_ignored() {
        let filter = SourceFilter::default().with_extra_where(Some("   "));
        assert_eq!(filter.source_predicate(&source()), None);
    }
}
