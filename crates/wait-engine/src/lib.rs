//! Condition-polling synchronization engine.
//!
//! Every UI mutation in this system is expressed as "wait until predicate P
//! holds, then act" rather than "sleep N seconds, then act". This crate
//! states that scheduling model once: a probe, a poll interval and a
//! deadline. All call sites reuse it instead of re-implementing the loop.

use std::future::Future;
use std::time::Duration;

use formpilot_core_types::FlowError;
use tokio::time::{sleep, Instant};
use tracing::trace;

/// Interval and deadline for one wait.
#[derive(Clone, Copy, Debug)]
pub struct PollConfig {
    pub timeout: Duration,
    pub interval: Duration,
}

impl PollConfig {
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        Self { timeout, interval }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            interval: Duration::from_millis(100),
        }
    }
}

/// Poll `probe` until it yields a value or the deadline expires.
///
/// The probe is invoked immediately, then at every `cfg.interval` until
/// `cfg.timeout` has elapsed. Contract:
///
/// - `Ok(Some(v))` resolves the wait at once; there is no minimum wait.
/// - `Ok(None)` means the condition does not hold yet.
/// - A transient error ([`FlowError::is_transient`]) also means "not yet":
///   elements legitimately vanish mid-poll while the interface re-renders.
/// - Any other error aborts the wait and propagates.
///
/// On expiry the wait fails with [`FlowError::WaitTimeout`] carrying `what`,
/// so callers must describe the condition precisely enough to diagnose which
/// wait failed.
pub async fn await_condition<T, F, Fut>(
    cfg: &PollConfig,
    what: &str,
    mut probe: F,
) -> Result<T, FlowError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, FlowError>>,
{
    let started = Instant::now();
    let deadline = started + cfg.timeout;
    loop {
        match probe().await {
            Ok(Some(value)) => {
                trace!(what, waited_ms = started.elapsed().as_millis() as u64, "condition met");
                return Ok(value);
            }
            Ok(None) => {}
            Err(err) if err.is_transient() => {
                trace!(what, %err, "transient probe error; treating as not yet true");
            }
            Err(err) => return Err(err),
        }
        if Instant::now() >= deadline {
            return Err(FlowError::WaitTimeout(format!(
                "{what} (waited {}ms)",
                started.elapsed().as_millis()
            )));
        }
        sleep(cfg.interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn cfg(timeout_ms: u64, interval_ms: u64) -> PollConfig {
        PollConfig::new(
            Duration::from_millis(timeout_ms),
            Duration::from_millis(interval_ms),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn already_true_returns_immediately() {
        let started = Instant::now();
        let value = await_condition(&cfg(1000, 100), "instant condition", || async {
            Ok(Some(42u32))
        })
        .await
        .unwrap();
        assert_eq!(value, 42);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn true_after_three_polls_takes_three_intervals() {
        let calls = AtomicU32::new(0);
        let calls = &calls;
        let started = Instant::now();
        let value = await_condition(&cfg(5000, 100), "third poll condition", move || async move {
            if calls.fetch_add(1, Ordering::SeqCst) < 3 {
                Ok(None)
            } else {
                Ok(Some("ready"))
            }
        })
        .await
        .unwrap();
        assert_eq!(value, "ready");
        assert!(started.elapsed() >= Duration::from_millis(300));
        assert!(started.elapsed() < Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn never_true_times_out_at_the_deadline() {
        let started = Instant::now();
        let result: Result<(), _> =
            await_condition(&cfg(500, 100), "doomed condition", || async { Ok(None) }).await;
        match result {
            Err(FlowError::WaitTimeout(reason)) => {
                assert!(reason.contains("doomed condition"), "reason: {reason}");
            }
            other => panic!("expected timeout, got {other:?}"),
        }
        assert!(started.elapsed() >= Duration::from_millis(500));
        assert!(started.elapsed() < Duration::from_millis(700));
    }

    #[tokio::test(start_paused = true)]
    async fn transient_errors_count_as_not_yet_true() {
        let calls = AtomicU32::new(0);
        let calls = &calls;
        let value = await_condition(&cfg(5000, 100), "flaky lookup", move || async move {
            match calls.fetch_add(1, Ordering::SeqCst) {
                0 => Err(FlowError::NotFound("mid re-render".into())),
                1 => Err(FlowError::StaleHandle("old epoch".into())),
                _ => Ok(Some(7u8)),
            }
        })
        .await
        .unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test(start_paused = true)]
    async fn non_transient_errors_propagate() {
        let result: Result<(), _> = await_condition(&cfg(5000, 100), "broken pipe", || async {
            Err(FlowError::DriverIo("socket closed".into()))
        })
        .await;
        assert!(matches!(result, Err(FlowError::DriverIo(_))));
    }
}
