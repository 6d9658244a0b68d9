//! Interface driver port.
//!
//! The core never talks to a concrete browser binding; it talks to the
//! [`Driver`] trait defined here. A production deployment plugs in a real
//! binding behind this trait; this repository ships only the in-memory
//! simulated driver in [`sim`], used by tests and the CLI's simulate mode.

mod ports;
mod selector;
pub mod sim;

pub use ports::Driver;
pub use selector::{Handle, Selector};
