//! Error taxonomy for the synchronization engine and batch controller.

use thiserror::Error;

/// Errors surfaced by the interface driver, the wait engine and everything
/// built on top of them.
///
/// `NotFound` and `StaleHandle` are transient by definition: elements
/// legitimately disappear and reappear while the interface re-renders, so the
/// wait engine absorbs them as "not yet true" instead of failing the poll.
#[derive(Debug, Error, Clone)]
pub enum FlowError {
    /// A wait deadline expired; carries the caller-supplied description.
    #[error("wait timed out: {0}")]
    WaitTimeout(String),

    /// No element currently matches the selector.
    #[error("element not found: {0}")]
    NotFound(String),

    /// The handle no longer corresponds to the rendered state.
    #[error("stale element handle: {0}")]
    StaleHandle(String),

    /// Interface session communication failure.
    #[error("driver I/O error: {0}")]
    DriverIo(String),

    /// A dependency required before the batch can start is missing or broken.
    /// Fatal: aborts the whole run after resource release.
    #[error("startup failure: {0}")]
    Startup(String),

    /// Anything else; treated like a timeout at record scope.
    #[error("internal error: {0}")]
    Internal(String),
}

impl FlowError {
    /// Transient errors count as "condition not yet true" inside a poll loop.
    pub fn is_transient(&self) -> bool {
        matches!(self, FlowError::NotFound(_) | FlowError::StaleHandle(_))
    }

    /// Only startup-phase errors terminate the run.
    pub fn is_fatal(&self) -> bool {
        matches!(self, FlowError::Startup(_))
    }
}
