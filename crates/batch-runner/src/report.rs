use chrono::{DateTime, Utc};
use formpilot_core_types::{RunId, ValidationOutcome};
use serde::{Deserialize, Serialize};

use crate::Phase;

/// Outcome of one record's drive through the state machine.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RecordReport {
    pub index: usize,
    pub name: String,
    /// Furthest phase completed.
    pub reached: Phase,
    pub submitted: bool,
    /// The transition failure that abandoned the record, if any.
    pub error: Option<String>,
    /// Field-level failures that degraded to warnings without abandoning
    /// the record.
    pub field_warnings: Vec<String>,
}

/// Always produced, even if every record failed.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BatchReport {
    pub run_id: RunId,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Records offered to the batch, before the eligibility gate.
    pub total: usize,
    /// Records excluded for lacking an identifying field.
    pub skipped: usize,
    pub submitted: usize,
    pub failed: usize,
    pub violations: Vec<ValidationOutcome>,
    pub records: Vec<RecordReport>,
}

impl BatchReport {
    /// One-line completion notice for the operator.
    pub fn summary(&self) -> String {
        format!(
            "batch complete: {} submitted, {} failed, {} skipped of {} records",
            self.submitted, self.failed, self.skipped, self.total
        )
    }
}
