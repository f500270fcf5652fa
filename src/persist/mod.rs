//! Periodic persistence
//!
//! A background task that snapshots the registry on a fixed interval and
//! performs one last save when asked to shut down.

pub mod driver;

pub use driver::{PersistenceDriver, PersistenceHandle, PersistenceStats};
