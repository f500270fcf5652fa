//! Crate-level error type

use thiserror::Error;

use crate::registry::RegistryError;
use crate::snapshot::SnapshotError;

/// Any error the server library can produce
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, Error>;
