//! Static configuration shared by the generator and the reader.
//!
//! Loaded once from TOML at startup and passed explicitly to both sides; nothing
//! here changes at runtime.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::naming::{QualifiedName, comparison_schema, version_alias};
use crate::topic::{Field, Topic};

/// Default Top-N used for benchmark comparison tables and report panels.
pub const DEFAULT_TOP_N: usize = 25;

/// Base and new dataset release labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VersionPair {
    pub base: String,
    pub new: String,
}

impl VersionPair {
    pub fn base_alias(&self) -> String {
        version_alias(&self.base)
    }

    pub fn new_alias(&self) -> String {
        version_alias(&self.new)
    }
}

impl Default for VersionPair {
    fn default() -> Self {
        Self {
            base: "v5_OCT25".to_string(),
            new: "v5_JAN26".to_string(),
        }
    }
}

/// Where comparison tables live and how to reach the warehouse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WarehouseSettings {
    /// Account locator; required for the SQL API backend only.
    pub account: Option<String>,
    /// Overrides `https://<account>.snowflakecomputing.com`.
    pub base_url: Option<String>,
    pub database: String,
    /// Defaults to `PDL_RELEASE_COMPARISONS_<BASE>_<NEW>`.
    pub schema: Option<String>,
    pub warehouse: Option<String>,
    pub role: Option<String>,
    /// Database holding one schema per dataset version.
    pub source_database: String,
    pub statement_timeout_secs: u64,
    pub session_ttl_secs: u64,
}

impl Default for WarehouseSettings {
    fn default() -> Self {
        Self {
            account: None,
            base_url: None,
            database: "PROJECT_DATA".to_string(),
            schema: None,
            warehouse: Some("WH_3_XS".to_string()),
            role: Some("ANALYST".to_string()),
            source_database: "pdl_clean".to_string(),
            statement_timeout_secs: 600,
            session_ttl_secs: 24 * 60 * 60,
        }
    }
}

/// External benchmark attached to a topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BenchmarkSettings {
    /// Display label; its alias names the benchmark columns (`ipeds` -> `CNT_IPEDS`).
    pub label: String,
    /// Benchmark table. Without it the benchmark metrics are omitted.
    pub from: Option<String>,
    /// Defaults to the topic identifier column.
    pub id_col: Option<String>,
    /// Defaults to the topic country column.
    pub country_col: Option<String>,
}

/// Per-field expression and source overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FieldOverride {
    pub v1_expr: Option<String>,
    pub v2_expr: Option<String>,
    pub lc_expr: Option<String>,
    pub v1_from: Option<String>,
    pub v2_from: Option<String>,
    pub lc_from: Option<String>,
}

/// Per-topic settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TopicSettings {
    /// Case-insensitive `ILIKE` patterns removed from every count.
    pub exclude_values: Vec<String>,
    /// Additional predicate applied to every source.
    pub extra_where: Option<String>,
    pub benchmark: Option<BenchmarkSettings>,
    pub fields: BTreeMap<Field, FieldOverride>,
}

/// Complete comparison configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ComparisonConfig {
    pub versions: VersionPair,
    /// Country allow-list, in display order.
    pub countries: Vec<String>,
    pub top_n: usize,
    pub warehouse: WarehouseSettings,
    pub topics: BTreeMap<Topic, TopicSettings>,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            versions: VersionPair::default(),
            countries: [
                "United States",
                "United Kingdom",
                "Singapore",
                "Canada",
                "Australia",
                "New Zealand",
                "Switzerland",
                "Hong Kong",
                "China",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            top_n: DEFAULT_TOP_N,
            warehouse: WarehouseSettings::default(),
            topics: BTreeMap::new(),
        }
    }
}

impl ComparisonConfig {
    /// Load and validate a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        let config: Self = toml::from_str(&text).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` when given, otherwise the built-in defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.versions.base.trim().is_empty() || self.versions.new.trim().is_empty() {
            return Err(ConfigError::invalid("version labels must not be empty"));
        }
        if self.versions.base_alias() == self.versions.new_alias() {
            return Err(ConfigError::invalid(format!(
                "base and new versions resolve to the same alias {:?}",
                self.versions.base_alias()
            )));
        }
        if self.top_n == 0 {
            return Err(ConfigError::invalid("top_n must be at least 1"));
        }
        if self.countries.iter().any(|c| c.trim().is_empty()) {
            return Err(ConfigError::invalid("country names must not be empty"));
        }
        for (topic, settings) in &self.topics {
            for field in settings.fields.keys() {
                if field.topic() != *topic {
                    return Err(ConfigError::FieldNotInTopic {
                        topic: *topic,
                        field: field.column_name().to_string(),
                    });
                }
            }
            if let Some(benchmark) = &settings.benchmark {
                let alias = version_alias(&benchmark.label);
                if alias.is_empty()
                    || alias == self.versions.base_alias()
                    || alias == self.versions.new_alias()
                {
                    return Err(ConfigError::invalid(format!(
                        "benchmark label {:?} for {topic} clashes with a version alias",
                        benchmark.label
                    )));
                }
            }
        }
        Ok(())
    }

    /// Settings for a topic; topics absent from the file use defaults.
    pub fn topic_settings(&self, topic: Topic) -> TopicSettings {
        self.topics.get(&topic).cloned().unwrap_or_default()
    }

    /// Schema holding the generated tables.
    pub fn schema(&self) -> String {
        self.warehouse
            .schema
            .clone()
            .unwrap_or_else(|| comparison_schema(&self.versions.base, &self.versions.new))
    }

    /// Fully-qualified path of a generated table.
    pub fn qualified(&self, table: &str) -> QualifiedName {
        QualifiedName::new(&self.warehouse.database, self.schema(), table)
    }

    /// Match a country against the allow-list, returning its canonical spelling.
    pub fn resolve_country(&self, input: &str) -> Result<&str> {
        let needle = input.trim();
        self.countries
            .iter()
            .find(|country| country.eq_ignore_ascii_case(needle))
            .map(String::as_str)
            .ok_or_else(|| ConfigError::UnknownCountry(input.to_string()))
    }

    /// Default source table of a dataset version for a topic.
    pub fn version_source(&self, version: &str, topic: Topic) -> String {
        format!(
            "{}.{}.{}",
            self.warehouse.source_database,
            version,
            topic.source_table()
        )
    }
}
