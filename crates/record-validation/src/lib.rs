//! Pre-flight validation gate.
//!
//! Pure functions over records, run once before any interface interaction.
//! Violations are advisory: they are recorded and surfaced so an operator
//! can abort manually, but every record proceeds to submission regardless.

use formpilot_core_types::{Record, RecordForm, UnitCatalog, ValidationOutcome};
use tracing::warn;

/// Eligibility gate, applied before validation: a record must carry at least
/// one non-empty identifying field to be part of the batch at all.
pub fn eligible(record: &Record) -> bool {
    record.has_identity()
}

/// Validate one record against the domain schema. Every rule is evaluated
/// independently; all violations are reported, not just the first.
pub fn validate(index: usize, record: &Record, catalog: &UnitCatalog) -> ValidationOutcome {
    let mut violations = Vec::new();
    match RecordForm::parse(&record.form) {
        None => {
            violations.push(format!(
                "form {:?} is not recognized; expected \"solid\" or \"liquid\"",
                record.form
            ));
        }
        Some(form) => {
            let category = form.unit_category();
            for (field, value) in [
                ("order unit", record.order_unit.as_str()),
                ("cost unit", record.cost_unit.as_str()),
            ] {
                let value = value.trim();
                if !value.is_empty() && !catalog.contains(category, value) {
                    violations.push(format!(
                        "{field} {value:?} is not valid for form {form}; allowed: {}",
                        catalog.names(category).join(", ")
                    ));
                }
            }
        }
    }
    ValidationOutcome { index, violations }
}

/// Validate a whole batch, logging each violation up front.
pub fn validate_batch(records: &[(usize, Record)], catalog: &UnitCatalog) -> Vec<ValidationOutcome> {
    let mut outcomes = Vec::with_capacity(records.len());
    for (index, record) in records {
        let outcome = validate(*index, record, catalog);
        for violation in &outcome.violations {
            warn!(index, name = %record.name, %violation, "validation violation");
        }
        outcomes.push(outcome);
    }
    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(form: &str, order_unit: &str, cost_unit: &str) -> Record {
        Record {
            name: "Widget".into(),
            description: String::new(),
            form: form.into(),
            order_unit: order_unit.into(),
            cost_unit: cost_unit.into(),
        }
    }

    #[test]
    fn clean_record_has_no_violations() {
        let outcome = validate(0, &record("solid", "kilogram", "tonne"), &UnitCatalog::default());
        assert!(outcome.is_clean());
    }

    #[test]
    fn liquid_unit_on_solid_form_is_exactly_one_violation() {
        let outcome = validate(0, &record("solid", "liter", ""), &UnitCatalog::default());
        assert_eq!(outcome.violations.len(), 1);
        let message = &outcome.violations[0];
        assert!(message.contains("order unit"), "message: {message}");
        assert!(message.contains("liter"), "message: {message}");
        assert!(message.contains("solid"), "message: {message}");
        assert!(message.contains("kilogram"), "message: {message}");
    }

    #[test]
    fn unrecognized_form_is_a_violation_regardless_of_units() {
        let outcome = validate(3, &record("plasma", "kilogram", "tonne"), &UnitCatalog::default());
        assert_eq!(outcome.index, 3);
        assert_eq!(outcome.violations.len(), 1);
        assert!(outcome.violations[0].contains("plasma"));
    }

    #[test]
    fn both_bad_units_are_both_reported() {
        let outcome = validate(0, &record("liquid", "kilogram", "tonne"), &UnitCatalog::default());
        assert_eq!(outcome.violations.len(), 2);
    }

    #[test]
    fn empty_units_are_not_violations() {
        let outcome = validate(0, &record("liquid", "", ""), &UnitCatalog::default());
        assert!(outcome.is_clean());
    }

    #[test]
    fn eligibility_requires_an_identifying_field() {
        let mut r = record("solid", "", "");
        assert!(eligible(&r));
        r.name = "  ".into();
        assert!(!eligible(&r));
    }
}
