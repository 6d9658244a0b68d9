//! Unit catalog: two disjoint categorical mappings from unit names to the
//! option codes the target interface uses.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::FlowError;

/// Partition of measurement units governing which names are valid for a
/// record form. Solid records order in mass units, liquid records in volume
/// units.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitCategory {
    Mass,
    Volume,
}

impl UnitCategory {
    pub fn label(self) -> &'static str {
        match self {
            UnitCategory::Mass => "mass",
            UnitCategory::Volume => "volume",
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct UnitEntry {
    name: String,
    code: String,
}

/// Process-wide static mapping of unit names to interface option codes.
///
/// Lookups are case-insensitive and whitespace-trimmed. An unresolved name
/// resolves to the category default code with a warning; it never fails.
/// This default-and-warn behavior is a deliberate product decision, not a
/// fallback of convenience.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UnitCatalog {
    mass: Vec<UnitEntry>,
    volume: Vec<UnitEntry>,
    mass_default: String,
    volume_default: String,
}

impl UnitCatalog {
    /// Build a catalog, enforcing code uniqueness within each category.
    pub fn new(
        mass: Vec<(String, String)>,
        volume: Vec<(String, String)>,
        mass_default: String,
        volume_default: String,
    ) -> Result<Self, FlowError> {
        for (label, entries) in [("mass", &mass), ("volume", &volume)] {
            for (i, (_, code)) in entries.iter().enumerate() {
                if entries[i + 1..].iter().any(|(_, other)| other == code) {
                    return Err(FlowError::Internal(format!(
                        "duplicate {label} unit code {code:?}"
                    )));
                }
            }
        }
        let entry = |(name, code): (String, String)| UnitEntry { name, code };
        Ok(Self {
            mass: mass.into_iter().map(entry).collect(),
            volume: volume.into_iter().map(entry).collect(),
            mass_default,
            volume_default,
        })
    }

    fn entries(&self, category: UnitCategory) -> &[UnitEntry] {
        match category {
            UnitCategory::Mass => &self.mass,
            UnitCategory::Volume => &self.volume,
        }
    }

    /// Default option code for a category.
    pub fn default_code(&self, category: UnitCategory) -> &str {
        match category {
            UnitCategory::Mass => &self.mass_default,
            UnitCategory::Volume => &self.volume_default,
        }
    }

    /// Whether `name` is a recognized unit of `category`.
    pub fn contains(&self, category: UnitCategory, name: &str) -> bool {
        let wanted = name.trim();
        self.entries(category)
            .iter()
            .any(|e| e.name.eq_ignore_ascii_case(wanted))
    }

    /// Recognized unit names of a category, in catalog order.
    pub fn names(&self, category: UnitCategory) -> Vec<&str> {
        self.entries(category)
            .iter()
            .map(|e| e.name.as_str())
            .collect()
    }

    /// All option codes of a category, in catalog order.
    pub fn codes(&self, category: UnitCategory) -> Vec<&str> {
        self.entries(category)
            .iter()
            .map(|e| e.code.as_str())
            .collect()
    }

    /// Resolve a unit name to its option code.
    ///
    /// Empty names fall back to the category default silently (the record
    /// simply did not specify a unit); unrecognized names fall back with a
    /// warning. Never fails.
    pub fn resolve(&self, category: UnitCategory, name: &str) -> String {
        let wanted = name.trim();
        if wanted.is_empty() {
            debug!(
                category = category.label(),
                code = self.default_code(category),
                "no unit given; using category default"
            );
            return self.default_code(category).to_string();
        }
        match self
            .entries(category)
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(wanted))
        {
            Some(entry) => entry.code.clone(),
            None => {
                warn!(
                    category = category.label(),
                    unit = wanted,
                    code = self.default_code(category),
                    "unrecognized unit name; using category default"
                );
                self.default_code(category).to_string()
            }
        }
    }
}

impl Default for UnitCatalog {
    /// The catalog of the target system: mass codes 1-3, volume codes 4-6.
    fn default() -> Self {
        let pair = |name: &str, code: &str| (name.to_string(), code.to_string());
        Self::new(
            vec![
                pair("gram", "1"),
                pair("kilogram", "2"),
                pair("tonne", "3"),
            ],
            vec![
                pair("milliliter", "4"),
                pair("liter", "5"),
                pair("hectoliter", "6"),
            ],
            "2".to_string(),
            "5".to_string(),
        )
        .expect("built-in catalog is well-formed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_recognized_pairs() {
        let catalog = UnitCatalog::default();
        assert_eq!(catalog.resolve(UnitCategory::Mass, "kilogram"), "2");
        assert_eq!(catalog.resolve(UnitCategory::Mass, "tonne"), "3");
        assert_eq!(catalog.resolve(UnitCategory::Volume, "liter"), "5");
    }

    #[test]
    fn lookup_trims_and_ignores_case() {
        let catalog = UnitCatalog::default();
        assert_eq!(catalog.resolve(UnitCategory::Mass, "  KiloGram "), "2");
        assert!(catalog.contains(UnitCategory::Volume, " LITER "));
    }

    #[test]
    fn unrecognized_name_falls_back_to_default() {
        let catalog = UnitCatalog::default();
        assert_eq!(catalog.resolve(UnitCategory::Mass, "furlong"), "2");
        assert_eq!(catalog.resolve(UnitCategory::Volume, "furlong"), "5");
    }

    #[test]
    fn empty_name_falls_back_to_default() {
        let catalog = UnitCatalog::default();
        assert_eq!(catalog.resolve(UnitCategory::Volume, ""), "5");
        assert_eq!(catalog.resolve(UnitCategory::Mass, "   "), "2");
    }

    #[test]
    fn duplicate_codes_rejected() {
        let pair = |name: &str, code: &str| (name.to_string(), code.to_string());
        let result = UnitCatalog::new(
            vec![pair("gram", "1"), pair("kilogram", "1")],
            vec![],
            "1".into(),
            "5".into(),
        );
        assert!(result.is_err());
    }
}
