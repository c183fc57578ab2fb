//! Closed enumerations of analysis topics and their comparison fields.
//!
//! Every topic/field pair the generator and reader understand is listed here.
//! Free-text input (CLI arguments, TOML keys) is resolved against these enums
//! once, so a typo fails immediately instead of producing an empty report.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::naming::clean_name;

/// Analysis domain with fixed source columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Topic {
    Education,
    Roles,
    Employers,
    Location,
}

impl Topic {
    pub const ALL: [Topic; 4] = [
        Topic::Education,
        Topic::Roles,
        Topic::Employers,
        Topic::Location,
    ];

    /// Lower-case name used in CLI arguments and configuration keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::Education => "education",
            Topic::Roles => "roles",
            Topic::Employers => "employers",
            Topic::Location => "location",
        }
    }

    /// Table inside each dataset version that holds this topic's rows.
    pub fn source_table(&self) -> &'static str {
        match self {
            Topic::Education => "education",
            Topic::Roles | Topic::Employers => "experience",
            Topic::Location => "root_person",
        }
    }

    /// Column used for country scoping.
    pub fn country_column(&self) -> &'static str {
        match self {
            Topic::Education | Topic::Location => "BGI_COUNTRY",
            Topic::Roles | Topic::Employers => "BGI_JOB_COUNTRY",
        }
    }

    /// Identifier column counted for coverage and profile counts.
    pub fn id_column(&self) -> &'static str {
        match self {
            Topic::Education | Topic::Location => "PERSON_ID",
            Topic::Roles | Topic::Employers => "ID",
        }
    }

    /// Fields compared for this topic, in display order.
    pub fn fields(&self) -> &'static [Field] {
        match self {
            Topic::Education => &[
                Field::BgiDegreeMaxPerEntry,
                Field::BgiDegreeMaxPerId,
                Field::BgiDegree,
                Field::BgiMajorCip6Name,
                Field::BgiSchoolName,
            ],
            Topic::Roles => &[
                Field::BgiSoc2Name,
                Field::BgiOnetName,
                Field::BgiSuboccupationName,
                Field::BgiStandardTitle,
            ],
            Topic::Employers => &[Field::BgiNaics2Name, Field::BgiCompanyName],
            Topic::Location => &[Field::BgiState, Field::BgiCountyName, Field::BgiCity],
        }
    }

    /// Title-cased label for headings.
    pub fn title(&self) -> &'static str {
        match self {
            Topic::Education => "Education",
            Topic::Roles => "Roles",
            Topic::Employers => "Employers",
            Topic::Location => "Location",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Topic {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Topic::ALL
            .iter()
            .copied()
            .find(|topic| topic.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| ConfigError::UnknownTopic(s.to_string()))
    }
}

/// Comparison field; each field belongs to exactly one topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Field {
    BgiDegreeMaxPerEntry,
    BgiDegreeMaxPerId,
    BgiDegree,
    BgiMajorCip6Name,
    BgiSchoolName,
    BgiSoc2Name,
    BgiOnetName,
    BgiSuboccupationName,
    BgiStandardTitle,
    BgiNaics2Name,
    BgiCompanyName,
    BgiState,
    BgiCountyName,
    BgiCity,
}

impl Field {
    pub const ALL: [Field; 14] = [
        Field::BgiDegreeMaxPerEntry,
        Field::BgiDegreeMaxPerId,
        Field::BgiDegree,
        Field::BgiMajorCip6Name,
        Field::BgiSchoolName,
        Field::BgiSoc2Name,
        Field::BgiOnetName,
        Field::BgiSuboccupationName,
        Field::BgiStandardTitle,
        Field::BgiNaics2Name,
        Field::BgiCompanyName,
        Field::BgiState,
        Field::BgiCountyName,
        Field::BgiCity,
    ];

    /// Source column name, also the default value expression.
    pub fn column_name(&self) -> &'static str {
        match self {
            Field::BgiDegreeMaxPerEntry => "BGI_DEGREE_MAX_PER_ENTRY",
            Field::BgiDegreeMaxPerId => "BGI_DEGREE_MAX_PER_ID",
            Field::BgiDegree => "BGI_DEGREE",
            Field::BgiMajorCip6Name => "BGI_MAJOR_CIP6_NAME",
            Field::BgiSchoolName => "BGI_SCHOOL_NAME",
            Field::BgiSoc2Name => "BGI_SOC2_NAME",
            Field::BgiOnetName => "BGI_ONET_NAME",
            Field::BgiSuboccupationName => "BGI_SUBOCCUPATION_NAME",
            Field::BgiStandardTitle => "BGI_STANDARD_TITLE",
            Field::BgiNaics2Name => "BGI_NAICS2_NAME",
            Field::BgiCompanyName => "BGI_COMPANY_NAME",
            Field::BgiState => "BGI_STATE",
            Field::BgiCountyName => "BGI_COUNTY_NAME",
            Field::BgiCity => "BGI_CITY",
        }
    }

    pub fn topic(&self) -> Topic {
        match self {
            Field::BgiDegreeMaxPerEntry
            | Field::BgiDegreeMaxPerId
            | Field::BgiDegree
            | Field::BgiMajorCip6Name
            | Field::BgiSchoolName => Topic::Education,
            Field::BgiSoc2Name
            | Field::BgiOnetName
            | Field::BgiSuboccupationName
            | Field::BgiStandardTitle => Topic::Roles,
            Field::BgiNaics2Name | Field::BgiCompanyName => Topic::Employers,
            Field::BgiState | Field::BgiCountyName | Field::BgiCity => Topic::Location,
        }
    }

    /// Degree-level fields are displayed in the canonical degree order.
    pub fn is_degree_level(&self) -> bool {
        matches!(
            self,
            Field::BgiDegreeMaxPerEntry | Field::BgiDegreeMaxPerId | Field::BgiDegree
        )
    }

    /// Caveat shown next to the field's comparison, if any.
    pub fn note(&self) -> Option<&'static str> {
        match self {
            Field::BgiStandardTitle => Some(
                "Standard Title format changed from singular to plural, \
                 so values do not match directly between the two versions.",
            ),
            _ => None,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

impl FromStr for Field {
    type Err = ConfigError;

    /// Accepts the column name in any case, with spaces or hyphens for
    /// underscores ("BGI Company Name").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = clean_name(s.trim());
        Field::ALL
            .iter()
            .copied()
            .find(|field| field.column_name() == needle)
            .ok_or_else(|| ConfigError::UnknownField(s.to_string()))
    }
}
