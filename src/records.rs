//! CSV-backed record provider.

use std::path::PathBuf;

use async_trait::async_trait;
use batch_runner::RecordProvider;
use formpilot_core_types::{FlowError, Record};
use tracing::debug;

/// Reads the batch from a CSV file with a header row. Recognized columns:
/// `name`, `description`, `form`, `order_unit`, `cost_unit`; all but `name`
/// may be absent. Extra columns are ignored.
pub struct CsvRecordProvider {
    path: PathBuf,
}

impl CsvRecordProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl RecordProvider for CsvRecordProvider {
    async fn fetch(&self) -> Result<Vec<Record>, FlowError> {
        let mut reader = csv::Reader::from_path(&self.path).map_err(|err| {
            FlowError::Startup(format!(
                "record source {} unreachable: {err}",
                self.path.display()
            ))
        })?;
        let mut records = Vec::new();
        for row in reader.deserialize::<Record>() {
            let record = row.map_err(|err| {
                FlowError::Startup(format!("bad record row in {}: {err}", self.path.display()))
            })?;
            records.push(record);
        }
        debug!(count = records.len(), path = %self.path.display(), "records loaded");
        Ok(records)
    }
}
