use std::sync::Arc;

use async_trait::async_trait;
use driver_api::Driver;
use formpilot_core_types::{FlowError, Record};

/// Source of the batch: an ordered, finite sequence of records. The core
/// does not care about their origin format.
#[async_trait]
pub trait RecordProvider: Send + Sync {
    async fn fetch(&self) -> Result<Vec<Record>, FlowError>;
}

/// Delivers the interface session already authenticated and positioned so
/// that the entry-creation affordance is reachable. The controller's first
/// action assumes this precondition holds.
#[async_trait]
pub trait SessionBootstrap: Send + Sync {
    async fn establish(&self) -> Result<Arc<dyn Driver>, FlowError>;
}
