//! Interface-free validation pass over a record file.
//!
//! Backs the `check` subcommand: loads the batch, applies the eligibility
//! gate and the validation rules, and returns the counts and findings the
//! CLI prints. Touches no driver.

use std::path::Path;

use anyhow::{Context, Result};
use batch_runner::RecordProvider;
use formpilot_core_types::UnitCatalog;

use crate::records::CsvRecordProvider;

/// What a validation-only pass found.
#[derive(Debug)]
pub struct CheckSummary {
    /// Records in the file, before the eligibility gate.
    pub total: usize,
    /// Eligible records with no violations.
    pub clean: usize,
    /// Eligible records with at least one violation.
    pub flagged: usize,
    /// Indices of records with no identifying field.
    pub skipped: Vec<usize>,
    /// (record index, violation message), in record order.
    pub findings: Vec<(usize, String)>,
}

pub async fn check_records(path: &Path) -> Result<CheckSummary> {
    let catalog = UnitCatalog::default();
    let batch = CsvRecordProvider::new(path)
        .fetch()
        .await
        .with_context(|| format!("loading records from {}", path.display()))?;

    let total = batch.len();
    let mut skipped = Vec::new();
    let mut eligible = Vec::new();
    for (index, record) in batch.into_iter().enumerate() {
        if record_validation::eligible(&record) {
            eligible.push((index, record));
        } else {
            skipped.push(index);
        }
    }

    let outcomes = record_validation::validate_batch(&eligible, &catalog);
    let mut findings = Vec::new();
    let mut flagged = 0usize;
    for outcome in &outcomes {
        for violation in &outcome.violations {
            findings.push((outcome.index, violation.clone()));
        }
        if !outcome.is_clean() {
            flagged += 1;
        }
    }

    Ok(CheckSummary {
        total,
        clean: eligible.len() - flagged,
        flagged,
        skipped,
        findings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn counts_clean_flagged_and_skipped_records() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "name,description,form,order_unit,cost_unit").unwrap();
        writeln!(file, "Granulate X,,solid,kilogram,tonne").unwrap();
        writeln!(file, "Mislabeled,,solid,liter,").unwrap();
        writeln!(file, "   ,,liquid,,").unwrap();

        let summary = check_records(file.path()).await.unwrap();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.clean, 1);
        assert_eq!(summary.flagged, 1);
        assert_eq!(summary.skipped, vec![2]);

        assert_eq!(summary.findings.len(), 1);
        let (index, message) = &summary.findings[0];
        assert_eq!(*index, 1);
        assert!(message.contains("liter"), "message: {message}");
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let err = check_records(Path::new("/nonexistent/batch.csv"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("batch.csv"));
    }
}
