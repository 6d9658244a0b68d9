use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use driver_api::Driver;
use element_access::Accessor;
use field_controls::FieldControls;
use formpilot_core_types::{FlowError, Record, RecordForm, RunId, Timeouts, UnitCatalog};
use modal_tracker::{ModalState, ModalTracker};
use tracing::{info, instrument, warn};

use crate::{BatchReport, EntryProfile, Phase, RecordReport, UnitSlot};

/// Drives the whole batch over one interface session.
///
/// The session is an explicit constructor argument threaded into every
/// component; there is no ambient handle anywhere. Records are driven one at
/// a time, strictly in input order.
pub struct BatchRunner {
    access: Accessor,
    fields: FieldControls,
    modal: ModalTracker,
    catalog: Arc<UnitCatalog>,
    profile: EntryProfile,
    timeouts: Timeouts,
}

impl BatchRunner {
    pub fn new(
        driver: Arc<dyn Driver>,
        catalog: Arc<UnitCatalog>,
        profile: EntryProfile,
        timeouts: Timeouts,
    ) -> Self {
        let access = Accessor::new(driver, timeouts.poll_interval);
        let fields = FieldControls::new(
            access.clone(),
            catalog.clone(),
            timeouts.poll_interval,
            timeouts.confirm,
        );
        let modal = ModalTracker::new(
            access.clone(),
            profile.modal_overlay(),
            timeouts.poll_interval,
        );
        Self {
            access,
            fields,
            modal,
            catalog,
            profile,
            timeouts,
        }
    }

    /// Run the batch. Never fails: validation is advisory, per-record
    /// failures are isolated, and a report is produced even when every
    /// record failed.
    pub async fn run(&self, records: Vec<Record>) -> BatchReport {
        let run_id = RunId::new();
        let started_at = Utc::now();
        let total = records.len();
        info!(%run_id, total, "batch run starting");

        let mut skipped = 0usize;
        let mut eligible = Vec::with_capacity(total);
        for (index, record) in records.into_iter().enumerate() {
            if record_validation::eligible(&record) {
                eligible.push((index, record));
            } else {
                warn!(index, "record has no identifying field; excluded from batch");
                skipped += 1;
            }
        }

        // the gate runs once over all records, before any UI interaction,
        // so an operator can abort manually if warranted
        let violations: Vec<_> = record_validation::validate_batch(&eligible, &self.catalog)
            .into_iter()
            .filter(|outcome| !outcome.is_clean())
            .collect();

        let mut records_out = Vec::with_capacity(eligible.len());
        let mut submitted = 0usize;
        let mut failed = 0usize;
        for (index, record) in &eligible {
            let report = self.run_record(*index, record).await;
            if report.submitted {
                submitted += 1;
            } else {
                failed += 1;
            }
            records_out.push(report);
        }

        let report = BatchReport {
            run_id,
            started_at,
            finished_at: Utc::now(),
            total,
            skipped,
            submitted,
            failed,
            violations,
            records: records_out,
        };
        info!("{}", report.summary());
        report
    }

    #[instrument(skip_all, fields(index = index, record = %record.name))]
    async fn run_record(&self, index: usize, record: &Record) -> RecordReport {
        let mut report = RecordReport {
            index,
            name: record.name.clone(),
            reached: Phase::Idle,
            submitted: false,
            error: None,
            field_warnings: Vec::new(),
        };
        if let Err(err) = self.drive(record, &mut report).await {
            warn!(
                reached = %report.reached,
                %err,
                "record abandoned; continuing with next record"
            );
            report.error = Some(err.to_string());
        }
        report
    }

    async fn drive(&self, record: &Record, report: &mut RecordReport) -> Result<(), FlowError> {
        // A lingering overlay from a previously abandoned form would make
        // this record's lookups target the wrong instance. No rollback is
        // attempted; give the overlay a short grace period and press on.
        if let Ok(ModalState::Open) = self.modal.state().await {
            warn!("overlay still visible before entry open; waiting briefly");
            let grace = self.timeouts.poll_interval * 10;
            if self.modal.await_closed(grace).await.is_err() {
                warn!("overlay did not clear; proceeding anyway");
            }
        }

        // Idle -> EntryOpened
        let create = self.profile.create_button();
        let handle = self.access.locate_one(&create, self.timeouts.locate).await?;
        self.access.driver().click(&handle).await?;
        // open is confirmed by the record's input fields becoming visible,
        // not by the overlay itself
        self.access
            .locate_one(&self.profile.name_input(), self.timeouts.locate)
            .await?;
        report.reached = Phase::EntryOpened;

        // EntryOpened -> NameFilled
        self.field_step(
            report,
            "name",
            self.fields
                .set_text(&self.profile.name_input(), &record.name, self.timeouts.locate),
        )
        .await;
        if let Some(description) = self.profile.description_input() {
            if !record.description.trim().is_empty() {
                self.field_step(
                    report,
                    "description",
                    self.fields
                        .set_text(&description, &record.description, self.timeouts.locate),
                )
                .await;
            }
        }
        report.reached = Phase::NameFilled;

        // NameFilled -> FormSelected
        let form = match RecordForm::parse(&record.form) {
            Some(form) => form,
            None => {
                warn!(form = %record.form, "unrecognized form; defaulting to solid");
                RecordForm::Solid
            }
        };
        self.field_step(
            report,
            "form",
            self.fields.select_value(
                &self.profile.form_select(),
                form.as_str(),
                self.timeouts.options,
            ),
        )
        .await;
        report.reached = Phase::FormSelected;

        // FormSelected -> UnitsConfirmed
        let category = form.unit_category();
        self.field_step(
            report,
            "order unit",
            self.fields.select_choice(
                &self.profile.unit_select(UnitSlot::Order),
                category,
                &record.order_unit,
                self.timeouts.options,
            ),
        )
        .await;
        self.field_step(
            report,
            "cost unit",
            self.fields.select_choice(
                &self.profile.unit_select(UnitSlot::Cost),
                category,
                &record.cost_unit,
                self.timeouts.options,
            ),
        )
        .await;
        report.reached = Phase::UnitsConfirmed;

        // UnitsConfirmed -> TogglesSet
        for label in &self.profile.switches {
            self.field_step(
                report,
                label,
                self.fields.toggle_switch(label, self.timeouts.locate),
            )
            .await;
        }
        report.reached = Phase::TogglesSet;

        // TogglesSet -> Submitted
        let submit = self.profile.submit_button();
        let handle = self.access.locate_one(&submit, self.timeouts.locate).await?;
        self.access.driver().click(&handle).await?;
        report.reached = Phase::Submitted;
        report.submitted = true;

        // Submitted -> ModalClosed; expiry is logged, never blocks the batch
        match self.modal.await_closed(self.timeouts.modal_close).await {
            Ok(()) => report.reached = Phase::ModalClosed,
            Err(err) => {
                warn!(%err, "modal did not close in time; proceeding to next record");
                report.field_warnings.push(format!("modal close: {err}"));
            }
        }
        Ok(())
    }

    /// Field population failures degrade to per-field warnings; they do not
    /// abandon the record.
    async fn field_step(
        &self,
        report: &mut RecordReport,
        what: &str,
        op: impl Future<Output = Result<(), FlowError>>,
    ) {
        if let Err(err) = op.await {
            warn!(field = what, %err, "field population failed; continuing record");
            report.field_warnings.push(format!("{what}: {err}"));
        }
    }
}
