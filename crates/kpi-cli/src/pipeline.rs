//! Batch execution of a generation plan.
//!
//! Statements run one after another over a single warehouse handle. A failed
//! statement is recorded with its table and the run moves on; only the final
//! report decides the exit status.

use std::time::Instant;

use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use kpi_model::Topic;
use kpi_sql::{GenerationPlan, PlanEntry};
use kpi_warehouse::Warehouse;
use tracing::{error, info, info_span, warn};

use crate::types::{GenerationReport, TableOutcome, TableStatus};

const PROGRESS_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {msg}";

/// Progress bar sized for the statements of a plan.
pub fn plan_progress(plan: &GenerationPlan) -> ProgressBar {
    let bar = ProgressBar::new(plan.ready_count() as u64);
    let style = ProgressStyle::default_bar()
        .template(PROGRESS_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    bar.set_style(style);
    bar
}

/// Run every ready statement of `plan`, recording one outcome per entry.
pub fn execute_plan(
    warehouse: &dyn Warehouse,
    topic: Topic,
    plan: &GenerationPlan,
    progress: &ProgressBar,
) -> GenerationReport {
    let started_at = Utc::now();
    let mut outcomes = Vec::with_capacity(plan.entries.len());

    for entry in &plan.entries {
        match entry {
            PlanEntry::Skipped(skipped) => {
                warn!(table = %skipped.table, reason = %skipped.reason, "table skipped");
                outcomes.push(TableOutcome {
                    kind: skipped.kind,
                    table: skipped.table.clone(),
                    status: TableStatus::Skipped {
                        reason: skipped.reason.clone(),
                    },
                });
            }
            PlanEntry::Ready(planned) => {
                let span = info_span!("table", table = %planned.table.table, kind = planned.kind.label());
                let _guard = span.enter();
                progress.set_message(planned.table.table.clone());
                let start = Instant::now();
                let status = match warehouse.execute(&planned.statement) {
                    Ok(()) => {
                        let duration = start.elapsed();
                        info!(
                            table = %planned.table,
                            duration_ms = duration.as_millis(),
                            "table created"
                        );
                        TableStatus::Created { duration }
                    }
                    Err(err) => {
                        error!(
                            table = %planned.table,
                            kind = %err.kind(),
                            error = %err,
                            "table failed"
                        );
                        TableStatus::Failed {
                            kind: err.kind(),
                            message: err.to_string(),
                        }
                    }
                };
                progress.inc(1);
                outcomes.push(TableOutcome {
                    kind: planned.kind,
                    table: planned.table.clone(),
                    status,
                });
            }
        }
    }
    progress.finish_and_clear();

    let report = GenerationReport {
        topic,
        backend: warehouse.name(),
        started_at,
        finished_at: Utc::now(),
        outcomes,
        script: None,
    };
    info!(
        topic = %topic,
        backend = report.backend,
        created = report.created_count(),
        skipped = report.skipped_count(),
        failed = report.failed_count(),
        duration_ms = report.elapsed().num_milliseconds(),
        "generation finished"
    );
    report
}
