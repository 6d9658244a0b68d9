//! Modal lifecycle tracker.
//!
//! The modal's state is never tracked as owned state: it is inferred
//! observationally from the presence and visibility of the designated
//! overlay region, recomputed on every check. Only the open-to-closed
//! transition matters here; "open" is asserted by the caller after
//! triggering an entry action and confirmed by the presence of the form's
//! input fields, not by this tracker.

use std::time::Duration;

use driver_api::Selector;
use element_access::Accessor;
use formpilot_core_types::FlowError;
use tracing::debug;
use wait_engine::{await_condition, PollConfig};

/// Observed state of the overlay region at one instant.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ModalState {
    Open,
    Closed,
}

pub struct ModalTracker {
    access: Accessor,
    overlay: Selector,
    interval: Duration,
}

impl ModalTracker {
    pub fn new(access: Accessor, overlay: Selector, interval: Duration) -> Self {
        Self {
            access,
            overlay,
            interval,
        }
    }

    /// One observation: open iff the overlay has at least one visible match.
    /// Zero matches, or matches that are all invisible, count as closed.
    pub async fn state(&self) -> Result<ModalState, FlowError> {
        match self.access.find_visible(&self.overlay).await? {
            Some(_) => Ok(ModalState::Open),
            None => Ok(ModalState::Closed),
        }
    }

    /// Poll until the overlay is observed closed.
    ///
    /// Callers treat expiry as non-fatal: an unclosed-but-stale modal does
    /// not block the batch, though it may cause the next record's lookups to
    /// target the wrong instance.
    pub async fn await_closed(&self, timeout: Duration) -> Result<(), FlowError> {
        let cfg = PollConfig::new(timeout, self.interval);
        let this = &*self;
        await_condition(
            &cfg,
            &format!("modal overlay {} to close", self.overlay),
            move || async move {
                match this.state().await? {
                    ModalState::Closed => Ok(Some(())),
                    ModalState::Open => Ok(None),
                }
            },
        )
        .await?;
        debug!(overlay = %self.overlay, "modal closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use driver_api::sim::SimDriver;
    use std::sync::Arc;
    use tokio::time::Instant;

    fn tracker(sim: SimDriver) -> (Arc<SimDriver>, ModalTracker) {
        let sim = Arc::new(sim);
        let access = Accessor::new(sim.clone(), Duration::from_millis(50));
        let tracker = ModalTracker::new(
            access,
            Selector::css(".modal-overlay"),
            Duration::from_millis(50),
        );
        (sim, tracker)
    }

    #[tokio::test(start_paused = true)]
    async fn absent_overlay_is_closed() {
        let (_sim, tracker) = tracker(SimDriver::blank());
        assert_eq!(tracker.state().await.unwrap(), ModalState::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn present_but_invisible_overlay_is_closed() {
        let sim = SimDriver::blank();
        sim.add_overlay(".modal-overlay");
        sim.set_visible(".modal-overlay", false);
        let (_sim, tracker) = tracker(sim);
        assert_eq!(tracker.state().await.unwrap(), ModalState::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn await_closed_resolves_when_overlay_detaches() {
        let sim = SimDriver::blank();
        sim.add_overlay(".modal-overlay");
        sim.remove_after(".modal-overlay", Duration::from_millis(300));
        let (_sim, tracker) = tracker(sim);

        let started = Instant::now();
        tracker.await_closed(Duration::from_secs(5)).await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn await_closed_times_out_on_a_stuck_overlay() {
        let sim = SimDriver::blank();
        sim.add_overlay(".modal-overlay");
        let (_sim, tracker) = tracker(sim);

        let err = tracker
            .await_closed(Duration::from_millis(400))
            .await
            .unwrap_err();
        assert!(matches!(err, FlowError::WaitTimeout(_)));
    }
}
