use std::fmt;

use serde::{Deserialize, Serialize};

/// Per-record submission state machine. Transitions are attempted strictly
/// in this order; the phase recorded in a report is the furthest one the
/// record completed.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    EntryOpened,
    NameFilled,
    FormSelected,
    UnitsConfirmed,
    TogglesSet,
    Submitted,
    ModalClosed,
}

impl Phase {
    pub fn label(self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::EntryOpened => "entry opened",
            Phase::NameFilled => "name filled",
            Phase::FormSelected => "form selected",
            Phase::UnitsConfirmed => "units confirmed",
            Phase::TogglesSet => "toggles set",
            Phase::Submitted => "submitted",
            Phase::ModalClosed => "modal closed",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_are_ordered() {
        assert!(Phase::Idle < Phase::EntryOpened);
        assert!(Phase::Submitted < Phase::ModalClosed);
        assert!(Phase::UnitsConfirmed < Phase::TogglesSet);
    }
}
