//! Shared primitives for the formpilot batch submission core.
//!
//! Everything here is plain data: the error taxonomy, the record model, the
//! unit catalog and the per-operation timeout configuration. No component in
//! this crate touches the interface session.

mod error;
mod record;
mod timeouts;
mod units;

pub use error::FlowError;
pub use record::{Record, RecordForm, ValidationOutcome};
pub use timeouts::Timeouts;
pub use units::{UnitCatalog, UnitCategory};

use std::fmt;

use uuid::Uuid;

/// Identifier for one batch run, stamped on logs and the final report.
#[derive(Clone, Debug, Eq, PartialEq, Hash, serde::Serialize, serde::Deserialize)]
pub struct RunId(pub String);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
