//! Field controllers: typed setters for text inputs, choice selectors and
//! toggle switches, built on the wait engine and the resilient accessor.
//!
//! Each operation is safe to call once per field per record. Failures are
//! returned to the caller; the batch controller decides whether they abort
//! the record or degrade to a per-field warning.

use std::sync::Arc;
use std::time::Duration;

use driver_api::Selector;
use element_access::Accessor;
use formpilot_core_types::{FlowError, UnitCatalog, UnitCategory};
use tracing::debug;
use wait_engine::{await_condition, PollConfig};

pub struct FieldControls {
    access: Accessor,
    catalog: Arc<UnitCatalog>,
    interval: Duration,
    /// Deadline for the commit-confirmation stage of a selection.
    confirm: Duration,
}

impl FieldControls {
    pub fn new(
        access: Accessor,
        catalog: Arc<UnitCatalog>,
        interval: Duration,
        confirm: Duration,
    ) -> Self {
        Self {
            access,
            catalog,
            interval,
            confirm,
        }
    }

    /// Locate a text input (presence + visibility), clear it, write `value`.
    ///
    /// No confirmation read-back: text fields are not re-rendered reactively
    /// in this system.
    pub async fn set_text(
        &self,
        selector: &Selector,
        value: &str,
        timeout: Duration,
    ) -> Result<(), FlowError> {
        let handle = self.access.locate_one(selector, timeout).await?;
        let driver = self.access.driver();
        driver.clear(&handle).await?;
        driver.type_text(&handle, value).await?;
        debug!(%selector, chars = value.len(), "text field written");
        Ok(())
    }

    /// Select the option with code `code` on a choice control whose option
    /// set may still be (re)populating.
    ///
    /// Three stages, each its own wait:
    /// 1. wait until an option with that code is rendered under the control
    ///    (the valid option set depends on an earlier selection and arrives
    ///    asynchronously);
    /// 2. re-fetch the option fresh and click it — the handle observed by
    ///    the wait predicate may already be stale;
    /// 3. wait until the control's current value equals `code`, re-fetching
    ///    the control on every poll. This closes the race where the click
    ///    registers before the framework commits its internal state.
    pub async fn select_value(
        &self,
        control: &Selector,
        code: &str,
        timeout: Duration,
    ) -> Result<(), FlowError> {
        let cfg = PollConfig::new(timeout, self.interval);
        let option = Selector::option_of(control, code);
        let access = &self.access;

        let option_ref = &option;
        await_condition(
            &cfg,
            &format!("option {code} rendered under {control}"),
            move || async move {
                let found = access.locate_all(option_ref).await?;
                Ok((!found.is_empty()).then_some(()))
            },
        )
        .await?;

        let fresh = self.access.locate_one(&option, timeout).await?;
        self.access.driver().click(&fresh).await?;

        let driver = self.access.driver();
        let control_ref = control;
        let confirm_cfg = PollConfig::new(self.confirm, self.interval);
        await_condition(
            &confirm_cfg,
            &format!("selection {code} committed on {control}"),
            move || async move {
                let handles = driver.locate_all(control_ref).await?;
                let Some(handle) = handles.first() else {
                    return Ok(None);
                };
                let value = driver.read_attribute(handle, "value").await?;
                Ok((value.as_deref() == Some(code)).then_some(()))
            },
        )
        .await?;
        debug!(%control, code, "selection committed");
        Ok(())
    }

    /// Resolve `unit_name` through the unit catalog (default-and-warn, never
    /// fails) and select the resulting code.
    pub async fn select_choice(
        &self,
        control: &Selector,
        category: UnitCategory,
        unit_name: &str,
        timeout: Duration,
    ) -> Result<(), FlowError> {
        let code = self.catalog.resolve(category, unit_name);
        self.select_value(control, &code, timeout).await
    }

    /// Click a toggle control addressed by its adjacent label text, exactly
    /// once. The controller does not track toggle state: calling this twice
    /// flips the switch twice.
    pub async fn toggle_switch(&self, label: &str, timeout: Duration) -> Result<(), FlowError> {
        let selector = Selector::label(label);
        let handle = self.access.locate_one(&selector, timeout).await?;
        self.access.driver().click(&handle).await?;
        debug!(label, "toggle clicked");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use driver_api::sim::{SimDriver, SimEvent};

    const TIMEOUT: Duration = Duration::from_secs(2);

    fn controls(sim: SimDriver) -> (Arc<SimDriver>, FieldControls) {
        let sim = Arc::new(sim);
        let access = Accessor::new(sim.clone(), Duration::from_millis(50));
        let fields = FieldControls::new(
            access,
            Arc::new(UnitCatalog::default()),
            Duration::from_millis(50),
            Duration::from_secs(1),
        );
        (sim, fields)
    }

    #[tokio::test(start_paused = true)]
    async fn set_text_clears_before_writing() {
        let sim = SimDriver::blank();
        sim.add_input("#name");
        let (sim, fields) = controls(sim);

        fields
            .set_text(&Selector::css("#name"), "Widget A", TIMEOUT)
            .await
            .unwrap();

        let events = sim.events();
        let cleared = events
            .iter()
            .position(|e| matches!(e, SimEvent::Cleared(t) if t == "#name"))
            .unwrap();
        let typed = events
            .iter()
            .position(|e| matches!(e, SimEvent::Typed { target, .. } if target == "#name"))
            .unwrap();
        assert!(cleared < typed);
        assert_eq!(sim.typed_into("#name"), vec!["Widget A".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn select_value_waits_for_late_options_and_confirms_commit() {
        let sim = SimDriver::blank();
        sim.add_choice("#unit");
        let (sim, fields) = controls(sim);

        // options arrive only after a while, as if repopulated by the
        // framework following an earlier selection
        let sim2 = sim.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(300)).await;
            sim2.add_option("#unit", "3");
        });

        fields
            .select_value(&Selector::css("#unit"), "3", TIMEOUT)
            .await
            .unwrap();
        assert_eq!(sim.committed_value("#unit"), Some("3".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn select_value_times_out_when_option_never_renders() {
        let sim = SimDriver::blank();
        sim.add_choice("#unit");
        let (_sim, fields) = controls(sim);

        let err = fields
            .select_value(&Selector::css("#unit"), "9", Duration::from_millis(400))
            .await
            .unwrap_err();
        assert!(matches!(err, FlowError::WaitTimeout(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn select_choice_resolves_units_through_the_catalog() {
        let sim = SimDriver::blank();
        sim.add_choice("#order-unit");
        sim.add_option("#order-unit", "2");
        let (sim, fields) = controls(sim);

        fields
            .select_choice(
                &Selector::css("#order-unit"),
                UnitCategory::Mass,
                " Kilogram ",
                TIMEOUT,
            )
            .await
            .unwrap();
        assert_eq!(sim.committed_value("#order-unit"), Some("2".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn toggle_switch_clicks_exactly_once_per_call() {
        let sim = SimDriver::blank();
        sim.add_toggle("Batch Managed");
        let (sim, fields) = controls(sim);

        fields.toggle_switch("Batch Managed", TIMEOUT).await.unwrap();
        assert_eq!(sim.clicks_on("label[Batch Managed]"), 1);

        // a second invocation flips it again; no state tracking
        fields.toggle_switch("Batch Managed", TIMEOUT).await.unwrap();
        assert_eq!(sim.clicks_on("label[Batch Managed]"), 2);
    }
}
