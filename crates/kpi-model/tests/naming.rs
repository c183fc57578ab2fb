//! Tests for the table naming contract shared by generator and reader.

use kpi_model::naming::{count_column, coverage_column, pct_column, profiles_column};
use kpi_model::{Field, TableKind, Topic, clean_name, make_table_name, version_alias};

#[test]
fn free_text_names_become_identifiers() {
    let name = make_table_name(
        TableKind::Kpi,
        "employers",
        "BGI Company Name",
        Some("United States"),
    );
    insta::assert_snapshot!(name, @"KPI_EMPLOYERS_BGI_COMPANY_NAME_UNITED_STATES");
    assert!(!name.contains(' '));
    assert!(!name.contains('-'));
    assert!(!name.contains('\''));
}

#[test]
fn typed_and_free_text_names_agree() {
    for kind in TableKind::ALL {
        for topic in Topic::ALL {
            for field in topic.fields() {
                let typed = kind.table_name(topic, *field, Some("Hong Kong"));
                let free = make_table_name(
                    kind,
                    &topic.title().to_lowercase(),
                    &field.column_name().replace('_', " "),
                    Some("hong-kong"),
                );
                assert_eq!(typed, free);
            }
        }
    }
}

#[test]
fn prefixes_per_table_kind() {
    let names: Vec<String> = TableKind::ALL
        .iter()
        .map(|kind| kind.table_name(Topic::Education, Field::BgiDegree, None))
        .collect();
    insta::assert_snapshot!(names.join(","), @"KPI_EDUCATION_BGI_DEGREE,COMP_EDUCATION_BGI_DEGREE,COMPLC_EDUCATION_BGI_DEGREE");
}

#[test]
fn apostrophes_are_dropped_not_replaced() {
    assert_eq!(clean_name("Côte d'Ivoire"), "C_TE_DIVOIRE");
    assert_eq!(clean_name("People's Republic"), "PEOPLES_REPUBLIC");
}

#[test]
fn metric_columns_use_upper_case_aliases() {
    let alias = version_alias("v5_JAN26");
    assert_eq!(count_column(&alias), "CNT_V5_JAN26");
    assert_eq!(pct_column("ipeds"), "PCT_IPEDS");
    assert_eq!(coverage_column(&alias), "COV_V5_JAN26");
    assert_eq!(profiles_column(&alias), "PROFILES_V5_JAN26");
}
