//! Profile and timeout configuration loading.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use batch_runner::EntryProfile;
use formpilot_core_types::Timeouts;

/// Load the site profile document (selectors and URLs of the target site).
pub fn load_profile(path: &Path) -> Result<EntryProfile> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading profile {}", path.display()))?;
    serde_yaml::from_str(&raw).with_context(|| format!("parsing profile {}", path.display()))
}

/// Build the run's timeouts from the CLI overrides.
pub fn timeouts_from_flags(timeout_ms: Option<u64>, poll_ms: Option<u64>) -> Timeouts {
    let mut timeouts = match timeout_ms {
        Some(ms) => Timeouts::from_base(Duration::from_millis(ms)),
        None => Timeouts::default(),
    };
    if let Some(ms) = poll_ms {
        timeouts.poll_interval = Duration::from_millis(ms);
    }
    timeouts
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn profile_round_trips_through_a_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "create_button: \"#create\"\n\
             name_input: \"#name\"\n\
             form_select: \"#form\"\n\
             order_unit_select: \"#order\"\n\
             cost_unit_select: \"#cost\"\n\
             submit_button: \"#submit\"\n\
             modal_overlay: \".overlay\"\n"
        )
        .unwrap();
        let profile = load_profile(file.path()).unwrap();
        assert_eq!(profile.create_button, "#create");
        assert!(profile.switches.is_empty());
        assert_eq!(profile.entry_url, None);
    }

    #[test]
    fn missing_profile_is_a_readable_error() {
        let err = load_profile(Path::new("/nonexistent/profile.yaml")).unwrap_err();
        assert!(err.to_string().contains("profile"));
    }

    #[test]
    fn flag_overrides_apply() {
        let timeouts = timeouts_from_flags(Some(2000), Some(40));
        assert_eq!(timeouts.locate, Duration::from_millis(2000));
        assert_eq!(timeouts.poll_interval, Duration::from_millis(40));

        let defaults = timeouts_from_flags(None, None);
        assert_eq!(defaults.locate, Timeouts::default().locate);
    }
}
