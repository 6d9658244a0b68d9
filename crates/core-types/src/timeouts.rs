//! Per-operation deadlines for the synchronization engine.

use std::time::Duration;

/// Deadlines for each class of wait the batch controller performs, plus the
/// shared poll interval. One instance is threaded through the whole run.
#[derive(Clone, Debug)]
pub struct Timeouts {
    /// Waiting for an element to be present and visible.
    pub locate: Duration,
    /// Waiting for a dropdown's option set to be (re)populated.
    pub options: Duration,
    /// Waiting for a clicked selection to be committed to the control value.
    pub confirm: Duration,
    /// Waiting for the confirmation modal to close after submit.
    pub modal_close: Duration,
    /// Interval between predicate polls.
    pub poll_interval: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            locate: Duration::from_secs(10),
            options: Duration::from_secs(10),
            confirm: Duration::from_secs(5),
            modal_close: Duration::from_secs(15),
            poll_interval: Duration::from_millis(100),
        }
    }
}

impl Timeouts {
    /// Scale every deadline from a single base, keeping the default ratios.
    /// Used by the CLI's `--timeout-ms` override.
    pub fn from_base(base: Duration) -> Self {
        Self {
            locate: base,
            options: base,
            confirm: base / 2,
            modal_close: base + base / 2,
            poll_interval: Duration::from_millis(100).min(base / 4),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_override_keeps_ratios() {
        let t = Timeouts::from_base(Duration::from_secs(4));
        assert_eq!(t.locate, Duration::from_secs(4));
        assert_eq!(t.confirm, Duration::from_secs(2));
        assert_eq!(t.modal_close, Duration::from_secs(6));
        assert_eq!(t.poll_interval, Duration::from_millis(100));
    }
}
