//! Library surface of the formpilot CLI.
//!
//! The synchronization core lives in the workspace crates; this crate only
//! carries the glue: configuration loading, the CSV record provider and the
//! simulated session bootstrap.

pub mod bootstrap;
pub mod check;
pub mod config;
pub mod records;

pub use batch_runner::{BatchReport, BatchRunner, EntryProfile, RecordProvider, SessionBootstrap};
pub use formpilot_core_types::{Record, Timeouts, UnitCatalog};
