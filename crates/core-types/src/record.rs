//! Record model: one logical form submission plus its validation outcome.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::UnitCategory;

/// One item to submit through the entry form. Created once per batch run and
/// immutable thereafter.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Display name; the identifying field. Records with an empty name are
    /// excluded from the batch before validation runs.
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Categorical form attribute; recognized values are "solid" and
    /// "liquid".
    #[serde(default)]
    pub form: String,
    #[serde(default)]
    pub order_unit: String,
    #[serde(default)]
    pub cost_unit: String,
}

impl Record {
    /// Eligibility gate: at least one non-empty identifying field.
    pub fn has_identity(&self) -> bool {
        !self.name.trim().is_empty()
    }
}

/// The two recognized values of the form attribute.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordForm {
    Solid,
    Liquid,
}

impl RecordForm {
    /// Case-insensitive, whitespace-trimmed parse; `None` for anything
    /// outside the two recognized values.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "solid" => Some(RecordForm::Solid),
            "liquid" => Some(RecordForm::Liquid),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RecordForm::Solid => "solid",
            RecordForm::Liquid => "liquid",
        }
    }

    /// Which unit partition is valid for records of this form.
    pub fn unit_category(self) -> UnitCategory {
        match self {
            RecordForm::Solid => UnitCategory::Mass,
            RecordForm::Liquid => UnitCategory::Volume,
        }
    }
}

impl fmt::Display for RecordForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-record validation result. Advisory only: violations are reported and
/// surfaced up front, they never remove a record from the batch.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub index: usize,
    pub violations: Vec<String>,
}

impl ValidationOutcome {
    pub fn clean(index: usize) -> Self {
        Self {
            index,
            violations: Vec::new(),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}
