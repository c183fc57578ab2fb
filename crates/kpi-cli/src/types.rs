use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use kpi_model::{QualifiedName, TableKind, Topic};
use kpi_warehouse::FailureKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableStatus {
    Created { duration: Duration },
    /// Not generated on purpose, e.g. no benchmark for a top-N table.
    Skipped { reason: String },
    Failed { kind: FailureKind, message: String },
}

#[derive(Debug, Clone)]
pub struct TableOutcome {
    pub kind: TableKind,
    pub table: QualifiedName,
    pub status: TableStatus,
}

impl TableOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self.status, TableStatus::Failed { .. })
    }
}

/// Result of one `generate` run.
#[derive(Debug)]
pub struct GenerationReport {
    pub topic: Topic,
    /// Warehouse backend name.
    pub backend: &'static str,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcomes: Vec<TableOutcome>,
    /// Script written by a dry run.
    pub script: Option<PathBuf>,
}

impl GenerationReport {
    pub fn created_count(&self) -> usize {
        self.count(|status| matches!(status, TableStatus::Created { .. }))
    }

    pub fn skipped_count(&self) -> usize {
        self.count(|status| matches!(status, TableStatus::Skipped { .. }))
    }

    pub fn failed_count(&self) -> usize {
        self.count(|status| matches!(status, TableStatus::Failed { .. }))
    }

    pub fn has_failures(&self) -> bool {
        self.outcomes.iter().any(TableOutcome::is_failure)
    }

    pub fn elapsed(&self) -> chrono::TimeDelta {
        self.finished_at - self.started_at
    }

    fn count(&self, predicate: impl Fn(&TableStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| predicate(&o.status)).count()
    }
}
