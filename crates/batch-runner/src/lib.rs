//! Batch submission controller.
//!
//! Drives each record through entry-form population, confirmation and
//! submission, isolating per-record failures: one record's failed transition
//! never aborts the batch. Records are processed strictly in input order,
//! one in flight at a time — the shared resource is the single interface
//! session.

mod phase;
mod ports;
mod profile;
mod report;
mod runner;

pub use phase::Phase;
pub use ports::{RecordProvider, SessionBootstrap};
pub use profile::{EntryProfile, UnitSlot};
pub use report::{BatchReport, RecordReport};
pub use runner::BatchRunner;
