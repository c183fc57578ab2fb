//! Resolved topic/field mappings.
//!
//! [`TopicSpec::resolve`] turns the TOML overrides into fully-specified sources
//! for every field of a topic. After resolution no lookup can fail on a typo:
//! the only remaining failure is asking a topic for a field it does not own.

use crate::config::{ComparisonConfig, TopicSettings};
use crate::error::{ConfigError, Result};
use crate::naming::version_alias;
use crate::topic::{Field, Topic};

/// One value-extraction expression bound to its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceExpr {
    /// SQL expression producing the compared value.
    pub expr: String,
    /// Table the expression reads from.
    pub from: String,
    pub id_col: String,
    pub country_col: String,
}

/// Benchmark source and the alias used for its columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchmarkSource {
    pub label: String,
    pub alias: String,
    pub source: SourceExpr,
}

/// Everything needed to generate the tables of one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMapping {
    pub topic: Topic,
    pub field: Field,
    pub base: SourceExpr,
    pub new: SourceExpr,
    /// `None` when the topic has no benchmark table.
    pub benchmark: Option<BenchmarkSource>,
}

/// A topic with all of its fields resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicSpec {
    pub topic: Topic,
    pub exclude_values: Vec<String>,
    pub extra_where: Option<String>,
    pub fields: Vec<FieldMapping>,
}

impl TopicSpec {
    pub fn resolve(config: &ComparisonConfig, topic: Topic) -> Result<Self> {
        let settings = config.topic_settings(topic);
        let fields = topic
            .fields()
            .iter()
            .map(|field| resolve_field(config, &settings, topic, *field))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            topic,
            exclude_values: settings.exclude_values,
            extra_where: settings.extra_where,
            fields,
        })
    }

    pub fn field(&self, field: Field) -> Result<&FieldMapping> {
        self.fields
            .iter()
            .find(|mapping| mapping.field == field)
            .ok_or_else(|| ConfigError::FieldNotInTopic {
                topic: self.topic,
                field: field.column_name().to_string(),
            })
    }

    /// Alias of the topic benchmark, if any field carries one.
    pub fn benchmark_alias(&self) -> Option<&str> {
        self.fields
            .iter()
            .find_map(|mapping| mapping.benchmark.as_ref())
            .map(|benchmark| benchmark.alias.as_str())
    }
}

fn resolve_field(
    config: &ComparisonConfig,
    settings: &TopicSettings,
    topic: Topic,
    field: Field,
) -> Result<FieldMapping> {
    let overrides = settings.fields.get(&field).cloned().unwrap_or_default();
    let column = field.column_name();
    let source = |expr: Option<String>, from: Option<String>, version: &str| SourceExpr {
        expr: expr.unwrap_or_else(|| column.to_string()),
        from: from.unwrap_or_else(|| config.version_source(version, topic)),
        id_col: topic.id_column().to_string(),
        country_col: topic.country_column().to_string(),
    };
    let base = source(overrides.v1_expr, overrides.v1_from, &config.versions.base);
    let new = source(overrides.v2_expr, overrides.v2_from, &config.versions.new);

    let benchmark = match &settings.benchmark {
        Some(bench) => overrides
            .lc_from
            .or_else(|| bench.from.clone())
            .map(|from| BenchmarkSource {
                label: bench.label.clone(),
                alias: version_alias(&bench.label),
                source: SourceExpr {
                    expr: overrides.lc_expr.unwrap_or_else(|| column.to_string()),
                    from,
                    id_col: bench
                        .id_col
                        .clone()
                        .unwrap_or_else(|| topic.id_column().to_string()),
                    country_col: bench
                        .country_col
                        .clone()
                        .unwrap_or_else(|| topic.country_column().to_string()),
                },
            }),
        None if overrides.lc_expr.is_some() || overrides.lc_from.is_some() => {
            return Err(ConfigError::invalid(format!(
                "{topic}.{field} sets a benchmark expression but {topic} has no [benchmark] section"
            )));
        }
        None => None,
    };

    Ok(FieldMapping {
        topic,
        field,
        base,
        new,
        benchmark,
    })
}
