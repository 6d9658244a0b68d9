//! Session bootstrap implementations.
//!
//! A production deployment supplies its own [`SessionBootstrap`] that logs
//! in and positions a real driver; this crate ships only the simulated one
//! for rehearsal runs.

use std::sync::Arc;

use async_trait::async_trait;
use batch_runner::{EntryProfile, SessionBootstrap};
use driver_api::sim::{EntrySiteSpec, SimDriver, SimLatency};
use driver_api::Driver;
use formpilot_core_types::{FlowError, UnitCatalog, UnitCategory};
use tracing::info;

/// Builds the in-memory entry site from the profile and hands back a session
/// already positioned at the entry page.
pub struct SimulatedBootstrap {
    profile: EntryProfile,
    catalog: Arc<UnitCatalog>,
}

impl SimulatedBootstrap {
    pub fn new(profile: EntryProfile, catalog: Arc<UnitCatalog>) -> Self {
        Self { profile, catalog }
    }
}

#[async_trait]
impl SessionBootstrap for SimulatedBootstrap {
    async fn establish(&self) -> Result<Arc<dyn Driver>, FlowError> {
        let spec = EntrySiteSpec {
            create_button: self.profile.create_button.clone(),
            name_input: self.profile.name_input.clone(),
            description_input: self.profile.description_input.clone(),
            form_select: self.profile.form_select.clone(),
            order_unit_select: self.profile.order_unit_select.clone(),
            cost_unit_select: self.profile.cost_unit_select.clone(),
            switches: self.profile.switches.clone(),
            submit_button: self.profile.submit_button.clone(),
            modal_overlay: self.profile.modal_overlay.clone(),
            form_options: vec!["solid".into(), "liquid".into()],
            mass_codes: self
                .catalog
                .codes(UnitCategory::Mass)
                .into_iter()
                .map(str::to_string)
                .collect(),
            volume_codes: self
                .catalog
                .codes(UnitCategory::Volume)
                .into_iter()
                .map(str::to_string)
                .collect(),
        };
        let driver = Arc::new(SimDriver::entry_site(spec, SimLatency::default()));
        if let Some(url) = &self.profile.entry_url {
            driver.navigate(url).await?;
        }
        info!("simulated session established");
        Ok(driver)
    }
}
