use async_trait::async_trait;
use formpilot_core_types::FlowError;

use crate::{Handle, Selector};

/// The interface session port.
///
/// One instance represents the single authenticated session a batch run owns.
/// Implementations must treat handles as snapshots of the rendered state:
/// operations on a handle that no longer matches the current render fail with
/// [`FlowError::StaleHandle`], and lookups with no current match fail with
/// [`FlowError::NotFound`] or return an empty sequence.
#[async_trait]
pub trait Driver: Send + Sync {
    async fn navigate(&self, url: &str) -> Result<(), FlowError>;

    async fn current_url(&self) -> Result<String, FlowError>;

    /// All current matches, in render order. Possibly empty; never waits.
    async fn locate_all(&self, selector: &Selector) -> Result<Vec<Handle>, FlowError>;

    async fn is_visible(&self, handle: &Handle) -> Result<bool, FlowError>;

    async fn click(&self, handle: &Handle) -> Result<(), FlowError>;

    async fn type_text(&self, handle: &Handle, text: &str) -> Result<(), FlowError>;

    async fn clear(&self, handle: &Handle) -> Result<(), FlowError>;

    async fn read_attribute(
        &self,
        handle: &Handle,
        name: &str,
    ) -> Result<Option<String>, FlowError>;

    /// Release the session. Idempotent; invoked on every exit path.
    async fn close(&self) -> Result<(), FlowError>;
}
