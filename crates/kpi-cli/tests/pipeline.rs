//! Integration tests for the generation batch.

use std::cell::RefCell;

use indicatif::ProgressBar;
use kpi_cli::pipeline::execute_plan;
use kpi_cli::types::TableStatus;
use kpi_model::{ComparisonConfig, Field, QualifiedName, TableKind, Topic, TopicSpec};
use kpi_sql::{GenerationPlan, PlanOptions, TopN, plan_topic};
use kpi_warehouse::{FailureKind, Warehouse, WarehouseError};
use polars::prelude::DataFrame;
use tempfile::tempdir;

/// Records statements and rejects those creating `fail_on`.
struct RecordingWarehouse {
    fail_on: Option<&'static str>,
    executed: RefCell<Vec<String>>,
}

impl RecordingWarehouse {
    fn new(fail_on: Option<&'static str>) -> Self {
        Self {
            fail_on,
            executed: RefCell::new(Vec::new()),
        }
    }
}

impl Warehouse for RecordingWarehouse {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn execute(&self, statement: &str) -> kpi_warehouse::Result<()> {
        self.executed.borrow_mut().push(statement.to_string());
        match self.fail_on {
            Some(table) if statement.contains(&format!(".{table} AS")) => {
                Err(WarehouseError::Sql {
                    code: "002003".to_string(),
                    sql_state: Some("42S02".to_string()),
                    message: "Object 'PDL_CLEAN.V5_JAN26.ROOT_PERSON' does not exist".to_string(),
                })
            }
            _ => Ok(()),
        }
    }

    fn read_table(&self, _table: &QualifiedName) -> kpi_warehouse::Result<DataFrame> {
        Err(WarehouseError::Unsupported {
            backend: "recording",
            operation: "read tables",
        })
    }
}

fn location_plan(fields: Vec<Field>) -> GenerationPlan {
    let config = ComparisonConfig::default();
    let spec = TopicSpec::resolve(&config, Topic::Location).unwrap();
    let options = PlanOptions::new(TopN::new(25)).with_fields(fields);
    plan_topic(&config, &spec, &options).unwrap()
}

#[test]
fn failed_statement_does_not_stop_the_batch() {
    let plan = location_plan(vec![Field::BgiState, Field::BgiCity]);
    let warehouse = RecordingWarehouse::new(Some("COMP_LOCATION_BGI_STATE"));

    let report = execute_plan(&warehouse, Topic::Location, &plan, &ProgressBar::hidden());

    assert_eq!(warehouse.executed.borrow().len(), 4);
    assert_eq!(report.outcomes.len(), 6);
    assert_eq!(report.created_count(), 3);
    assert_eq!(report.skipped_count(), 2);
    assert_eq!(report.failed_count(), 1);
    assert!(report.has_failures());
    assert_eq!(report.backend, "recording");

    let failed = &report.outcomes[1];
    assert_eq!(failed.kind, TableKind::Comparison);
    assert_eq!(failed.table.table, "COMP_LOCATION_BGI_STATE");
    match &failed.status {
        TableStatus::Failed { kind, message } => {
            assert_eq!(*kind, FailureKind::Sql);
            assert!(message.contains("002003"));
        }
        other => panic!("expected failure, got {other:?}"),
    }

    // the next field still ran
    assert!(matches!(
        report.outcomes[3].status,
        TableStatus::Created { .. }
    ));
    assert!(report.finished_at >= report.started_at);
}

#[test]
fn skipped_tables_are_not_failures() {
    let plan = location_plan(vec![Field::BgiCity]);
    let warehouse = RecordingWarehouse::new(None);

    let report = execute_plan(&warehouse, Topic::Location, &plan, &ProgressBar::hidden());

    assert!(!report.has_failures());
    let skipped = report
        .outcomes
        .iter()
        .find(|o| o.kind == TableKind::BenchmarkComparison)
        .unwrap();
    assert!(matches!(skipped.status, TableStatus::Skipped { .. }));
}

#[test]
fn dry_run_script_collects_every_statement() {
    let dir = tempdir().expect("tempdir");
    let script = kpi_warehouse::ScriptWarehouse::create(dir.path(), "location.sql").unwrap();
    let plan = location_plan(vec![Field::BgiState]);

    let report = execute_plan(&script, Topic::Location, &plan, &ProgressBar::hidden());

    assert_eq!(report.backend, "script");
    assert_eq!(report.created_count(), 2);
    let text = std::fs::read_to_string(script.path()).unwrap();
    assert_eq!(text.matches("CREATE OR REPLACE TABLE").count(), 2);
    assert!(text.contains("PDL_RELEASE_COMPARISONS_V5_OCT25_V5_JAN26.KPI_LOCATION_BGI_STATE AS"));
}
