use driver_api::Selector;
use serde::{Deserialize, Serialize};

/// Role tag for the two sibling unit selectors.
///
/// The selectors are resolved by role through the profile, never by ordinal
/// position among siblings, so a change in rendering order cannot silently
/// mis-assign them.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitSlot {
    Order,
    Cost,
}

/// Concrete selectors and URLs of one target site. Loaded from a profile
/// document; the core never hard-codes a selector.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EntryProfile {
    /// Page holding the entry-creation affordance; `None` when the session
    /// bootstrap already leaves the driver positioned there.
    #[serde(default)]
    pub entry_url: Option<String>,
    pub create_button: String,
    pub name_input: String,
    #[serde(default)]
    pub description_input: Option<String>,
    pub form_select: String,
    pub order_unit_select: String,
    pub cost_unit_select: String,
    /// Label texts of the switches flipped once per record.
    #[serde(default)]
    pub switches: Vec<String>,
    pub submit_button: String,
    pub modal_overlay: String,
}

impl EntryProfile {
    pub fn create_button(&self) -> Selector {
        Selector::css(&self.create_button)
    }

    pub fn name_input(&self) -> Selector {
        Selector::css(&self.name_input)
    }

    pub fn description_input(&self) -> Option<Selector> {
        self.description_input.as_deref().map(Selector::css)
    }

    pub fn form_select(&self) -> Selector {
        Selector::css(&self.form_select)
    }

    /// Resolve a unit selector by role.
    pub fn unit_select(&self, slot: UnitSlot) -> Selector {
        match slot {
            UnitSlot::Order => Selector::css(&self.order_unit_select),
            UnitSlot::Cost => Selector::css(&self.cost_unit_select),
        }
    }

    pub fn submit_button(&self) -> Selector {
        Selector::css(&self.submit_button)
    }

    pub fn modal_overlay(&self) -> Selector {
        Selector::css(&self.modal_overlay)
    }
}
