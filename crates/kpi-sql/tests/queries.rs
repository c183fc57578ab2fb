//! Tests for the generated query shapes.

use kpi_model::{
    BenchmarkSettings, ComparisonConfig, Field, FieldMapping, TableKind, Topic, TopicSettings,
    TopicSpec,
};
use kpi_sql::{
    PlanEntry, PlanOptions, RankSource, SourceFilter, SqlError, TopN, generate_comparison_query,
    generate_kpi_query, generate_top_n_comparison_query, plan_topic,
};

fn education_config(with_benchmark: bool) -> ComparisonConfig {
    let mut config = ComparisonConfig::default();
    config.topics.insert(
        Topic::Education,
        TopicSettings {
            exclude_values: vec!["unknown".to_string()],
            benchmark: with_benchmark.then(|| BenchmarkSettings {
                label: "ipeds".to_string(),
                from: Some("benchmarks.ipeds.completions".to_string()),
                id_col: Some("UNITID".to_string()),
                country_col: None,
            }),
            ..TopicSettings::default()
        },
    );
    config
}

fn mapping(config: &ComparisonConfig, field: Field) -> FieldMapping {
    TopicSpec::resolve(config, field.topic())
        .unwrap()
        .field(field)
        .unwrap()
        .clone()
}

/// Text between the last top-level `SELECT` and the following `FROM`.
fn final_select_columns(sql: &str) -> Vec<String> {
    let start = sql.rfind("\nSELECT\n").expect("final select") + "\nSELECT\n".len();
    let end = start + sql[start..].find("\nFROM").expect("final from");
    sql[start..end]
        .split(",\n")
        .map(|column| column.trim().to_string())
        .collect()
}

#[test]
fn kpi_query_is_a_single_row_with_four_metrics() {
    let config = education_config(false);
    let mapping = mapping(&config, Field::BgiDegreeMaxPerId);
    let exclude = vec!["unknown".to_string()];
    let sql = generate_kpi_query(&mapping, &config.versions, &SourceFilter::new(&exclude));

    assert!(!sql.contains("GROUP BY"));
    assert!(sql.contains(
        "COUNT(DISTINCT CASE WHEN FIELD_VALUE IS NOT NULL AND FIELD_VALUE NOT ILIKE '%unknown%' THEN ID END) AS PROFILES"
    ));
    let columns = final_select_columns(&sql);
    assert_eq!(
        columns,
        vec![
            "COALESCE(CAST(kpi_base.PROFILES AS DOUBLE) / NULLIF(kpi_base.TOTAL, 0), 0) AS COV_V5_OCT25",
            "COALESCE(CAST(kpi_new.PROFILES AS DOUBLE) / NULLIF(kpi_new.TOTAL, 0), 0) AS COV_V5_JAN26",
            "kpi_base.PROFILES AS PROFILES_V5_OCT25",
            "kpi_new.PROFILES AS PROFILES_V5_JAN26",
        ]
    );
    assert!(sql.ends_with("FROM kpi_base\nCROSS JOIN kpi_new"));
}

#[test]
fn kpi_query_adds_benchmark_metrics_only_when_configured() {
    let config = education_config(true);
    let mapping = mapping(&config, Field::BgiDegree);
    let sql = generate_kpi_query(&mapping, &config.versions, &SourceFilter::default());

    assert!(sql.contains("SELECT UNITID AS ID, BGI_DEGREE AS FIELD_VALUE"));
    assert!(sql.contains("FROM benchmarks.ipeds.completions"));
    assert_eq!(final_select_columns(&sql).len(), 6);
    assert!(sql.contains("AS COV_IPEDS"));
    assert!(sql.contains("AS PROFILES_IPEDS"));
    assert!(sql.ends_with("CROSS JOIN kpi_lc"));
}

#[test]
fn comparison_query_full_text() {
    let config = ComparisonConfig::default();
    let mapping = mapping(&config, Field::BgiDegree);
    let sql = generate_comparison_query(&mapping, &config.versions, &SourceFilter::default());

    let expected = "\
WITH src_base AS (
    SELECT PERSON_ID AS ID, BGI_DEGREE AS FIELD_VALUE
    FROM pdl_clean.v5_OCT25.education
),
src_new AS (
    SELECT PERSON_ID AS ID, BGI_DEGREE AS FIELD_VALUE
    FROM pdl_clean.v5_JAN26.education
),
cnt_base AS (
    SELECT FIELD_VALUE, COUNT(DISTINCT ID) AS CNT
    FROM src_base
    WHERE FIELD_VALUE IS NOT NULL
    GROUP BY FIELD_VALUE
),
cnt_new AS (
    SELECT FIELD_VALUE, COUNT(DISTINCT ID) AS CNT
    FROM src_new
    WHERE FIELD_VALUE IS NOT NULL
    GROUP BY FIELD_VALUE
),
merged AS (
    SELECT
        COALESCE(cnt_base.FIELD_VALUE, cnt_new.FIELD_VALUE) AS FIELD_VALUE,
        COALESCE(cnt_base.CNT, 0) AS CNT_V5_OCT25,
        COALESCE(cnt_new.CNT, 0) AS CNT_V5_JAN26
    FROM cnt_base
    FULL OUTER JOIN cnt_new ON cnt_base.FIELD_VALUE = cnt_new.FIELD_VALUE
)
SELECT
    merged.FIELD_VALUE AS FIELD_VALUE,
    merged.CNT_V5_OCT25,
    merged.CNT_V5_JAN26
FROM merged";
    assert_eq!(sql, expected);
}

#[test]
fn comparison_query_left_joins_benchmark() {
    let config = education_config(true);
    let mapping = mapping(&config, Field::BgiDegree);
    let sql = generate_comparison_query(&mapping, &config.versions, &SourceFilter::default());

    assert!(sql.contains("FULL OUTER JOIN cnt_new"));
    assert!(sql.contains("COALESCE(cnt_lc.CNT, 0) AS CNT_IPEDS"));
    assert!(sql.ends_with("LEFT JOIN cnt_lc ON cnt_lc.FIELD_VALUE = merged.FIELD_VALUE"));
    assert!(!sql.contains("FULL OUTER JOIN cnt_lc"));
    assert!(!sql.contains("ORDER BY"));
}

#[test]
fn country_scope_filters_every_source() {
    let config = education_config(true);
    let mapping = mapping(&config, Field::BgiDegree);
    let filter = SourceFilter::default().with_country(Some("United Kingdom"));
    let sql = generate_comparison_query(&mapping, &config.versions, &filter);

    assert_eq!(
        sql.matches("WHERE BGI_COUNTRY = 'United Kingdom'").count(),
        3
    );
}

#[test]
fn top_n_ranks_by_benchmark_by_default() {
    let config = education_config(true);
    let mapping = mapping(&config, Field::BgiDegreeMaxPerId);
    let sql = generate_top_n_comparison_query(
        &mapping,
        &config.versions,
        &SourceFilter::default(),
        TopN::new(25),
    )
    .unwrap();

    assert!(sql.contains(
        "ranked AS (\n    SELECT FIELD_VALUE, CNT\n    FROM cnt_lc\n    ORDER BY CNT DESC, FIELD_VALUE ASC\n    LIMIT 25\n)"
    ));
    let columns = final_select_columns(&sql);
    assert_eq!(columns[0], "ranked.FIELD_VALUE AS FIELD_VALUE");
    assert_eq!(columns.len(), 7);
    assert!(columns.iter().any(|c| c.ends_with("AS PCT_IPEDS")));
    assert!(sql.contains("NULLIF(totals.TOTAL_base, 0), 0) AS PCT_V5_OCT25"));
}

#[test]
fn top_n_without_benchmark_needs_explicit_rank_source() {
    let config = education_config(false);
    let mapping = mapping(&config, Field::BgiDegree);
    let filter = SourceFilter::default();

    let err = generate_top_n_comparison_query(&mapping, &config.versions, &filter, TopN::new(25))
        .unwrap_err();
    assert!(matches!(
        err,
        SqlError::MissingBenchmark {
            topic: Topic::Education,
            field: Field::BgiDegree
        }
    ));

    let sql = generate_top_n_comparison_query(
        &mapping,
        &config.versions,
        &filter,
        TopN::new(10).ranked_by(RankSource::New),
    )
    .unwrap();
    assert!(sql.contains("FROM cnt_new\n    ORDER BY CNT DESC"));
    assert!(sql.contains("LIMIT 10"));
    assert!(!sql.contains("cnt_lc"));
}

#[test]
fn top_n_rejects_zero() {
    let config = education_config(true);
    let mapping = mapping(&config, Field::BgiDegree);
    let result = generate_top_n_comparison_query(
        &mapping,
        &config.versions,
        &SourceFilter::default(),
        TopN::new(0),
    );
    assert!(matches!(result, Err(SqlError::EmptyTopN)));
}

#[test]
fn plan_covers_fields_countries_and_kinds() {
    let config = education_config(false);
    let spec = TopicSpec::resolve(&config, Topic::Education).unwrap();
    let options = PlanOptions::new(TopN::new(25))
        .with_fields(vec![Field::BgiDegree, Field::BgiSchoolName])
        .with_countries(vec!["United States".to_string(), "Canada".to_string()]);
    let plan = plan_topic(&config, &spec, &options).unwrap();

    // 2 fields x 2 countries x (KPI + COMP); top-N skipped without a benchmark
    assert_eq!(plan.ready_count(), 8);
    assert_eq!(plan.skipped().count(), 4);

    let first = plan.ready().next().unwrap();
    assert_eq!(first.kind, TableKind::Kpi);
    insta::assert_snapshot!(
        first.table,
        @"PROJECT_DATA.PDL_RELEASE_COMPARISONS_V5_OCT25_V5_JAN26.KPI_EDUCATION_BGI_DEGREE_UNITED_STATES"
    );
    assert!(first.statement.starts_with(
        "CREATE OR REPLACE TABLE PROJECT_DATA.PDL_RELEASE_COMPARISONS_V5_OCT25_V5_JAN26.KPI_EDUCATION_BGI_DEGREE_UNITED_STATES AS\nWITH src_base AS ("
    ));
    assert!(first.statement.contains("WHERE BGI_COUNTRY = 'United States'"));
    assert!(matches!(plan.entries[2], PlanEntry::Skipped(_)));
}

#[test]
fn plan_defaults_to_all_fields_unscoped() {
    let config = education_config(true);
    let spec = TopicSpec::resolve(&config, Topic::Education).unwrap();
    let plan = plan_topic(&config, &spec, &PlanOptions::new(TopN::new(25))).unwrap();

    assert_eq!(plan.ready_count(), Topic::Education.fields().len() * 3);
    assert!(plan.ready().all(|t| t.country.is_none()));
    assert!(
        plan.ready()
            .any(|t| t.table.table == "COMPLC_EDUCATION_BGI_SCHOOL_NAME")
    );
}

#[test]
fn plan_rejects_field_of_other_topic() {
    let config = education_config(false);
    let spec = TopicSpec::resolve(&config, Topic::Education).unwrap();
    let options = PlanOptions::new(TopN::new(25)).with_fields(vec![Field::BgiCity]);
    assert!(matches!(
        plan_topic(&config, &spec, &options),
        Err(SqlError::Config(_))
    ));
}
