//! Resilient element accessor.
//!
//! Wraps locator lookups so that no handle is ever held across a render
//! boundary: every operation that follows a mutation re-runs the lookup from
//! scratch. This is the core defense against stale references in an
//! interface that detaches and re-attaches elements on re-render.

use std::sync::Arc;
use std::time::Duration;

use driver_api::{Driver, Handle, Selector};
use formpilot_core_types::FlowError;
use tracing::trace;
use wait_engine::{await_condition, PollConfig};

/// Locator front-end over the interface driver.
///
/// `locate_all` is a snapshot of the current render; `locate_one` waits for
/// presence *and* visibility and always returns a handle fetched on the poll
/// that succeeded, never one cached earlier.
#[derive(Clone)]
pub struct Accessor {
    driver: Arc<dyn Driver>,
    interval: Duration,
}

impl Accessor {
    pub fn new(driver: Arc<dyn Driver>, interval: Duration) -> Self {
        Self { driver, interval }
    }

    pub fn driver(&self) -> &Arc<dyn Driver> {
        &self.driver
    }

    /// All current matches, in render order; possibly empty. Never waits.
    pub async fn locate_all(&self, selector: &Selector) -> Result<Vec<Handle>, FlowError> {
        self.driver.locate_all(selector).await
    }

    /// Single-shot lookup: the first currently visible match, if any.
    /// Handles that go stale between the lookup and the visibility check
    /// count as no match.
    pub async fn find_visible(&self, selector: &Selector) -> Result<Option<Handle>, FlowError> {
        let handles = self.driver.locate_all(selector).await?;
        for handle in handles {
            match self.driver.is_visible(&handle).await {
                Ok(true) => return Ok(Some(handle)),
                Ok(false) => {}
                Err(err) if err.is_transient() => {
                    trace!(%selector, %err, "handle vanished between lookup and visibility check");
                }
                Err(err) => return Err(err),
            }
        }
        Ok(None)
    }

    /// Wait until at least one match of `selector` exists and is visible,
    /// then return it. The returned handle is from the final poll and must
    /// be used before the next mutation.
    pub async fn locate_one(
        &self,
        selector: &Selector,
        timeout: Duration,
    ) -> Result<Handle, FlowError> {
        let cfg = PollConfig::new(timeout, self.interval);
        let this = &*self;
        await_condition(
            &cfg,
            &format!("visible element {selector}"),
            move || async move { this.find_visible(selector).await },
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use driver_api::sim::SimDriver;
    use tokio::time::Instant;

    fn accessor(sim: SimDriver) -> (Arc<SimDriver>, Accessor) {
        let sim = Arc::new(sim);
        let access = Accessor::new(sim.clone(), Duration::from_millis(50));
        (sim, access)
    }

    #[tokio::test(start_paused = true)]
    async fn locate_one_waits_for_visibility_not_just_presence() {
        let sim = SimDriver::blank();
        sim.add_button("#create");
        sim.conceal("#create", Duration::from_millis(300));
        let (_sim, access) = accessor(sim);

        let started = Instant::now();
        let handle = access
            .locate_one(&Selector::css("#create"), Duration::from_secs(2))
            .await
            .unwrap();
        assert!(started.elapsed() >= Duration::from_millis(300));
        let _ = handle;
    }

    #[tokio::test(start_paused = true)]
    async fn locate_one_times_out_with_selector_in_reason() {
        let sim = SimDriver::blank();
        let (_sim, access) = accessor(sim);
        let err = access
            .locate_one(&Selector::css("#missing"), Duration::from_millis(400))
            .await
            .unwrap_err();
        match err {
            FlowError::WaitTimeout(reason) => assert!(reason.contains("#missing")),
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn locate_one_survives_a_rerender_mid_wait() {
        let sim = SimDriver::blank();
        sim.add_input("#name");
        let (sim, access) = accessor(sim);

        // grab a handle, invalidate it, and confirm a fresh locate_one still
        // resolves rather than tripping over the stale snapshot
        let old = access.locate_all(&Selector::css("#name")).await.unwrap()[0];
        sim.rerender("#name");
        let fresh = access
            .locate_one(&Selector::css("#name"), Duration::from_secs(1))
            .await
            .unwrap();
        assert_ne!(old.epoch, fresh.epoch);
    }

    #[tokio::test(start_paused = true)]
    async fn locate_all_is_a_plain_snapshot() {
        let sim = SimDriver::blank();
        let (_sim, access) = accessor(sim);
        let started = Instant::now();
        let matches = access.locate_all(&Selector::css("#nothing")).await.unwrap();
        assert!(matches.is_empty());
        assert_eq!(started.elapsed(), Duration::ZERO);
    }
}
