//! Snapshot error types

use std::path::PathBuf;

use thiserror::Error;

use crate::registry::TopicId;

/// Error type for snapshot load and save
///
/// Load errors are fatal at startup; save errors are logged and retried on
/// the next persistence cycle.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Snapshot file could not be opened or read
    #[error("cannot read snapshot {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Snapshot file is not a valid topic list
    #[error("cannot decode snapshot {path}: {source}")]
    Decode {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// A record decoded but breaks a topic invariant
    #[error("invalid topic {id} in snapshot {path}: {reason}")]
    InvalidTopic {
        path: PathBuf,
        id: TopicId,
        reason: &'static str,
    },

    /// Topic list could not be encoded
    #[error("cannot encode snapshot: {0}")]
    Encode(#[source] serde_json::Error),

    /// Snapshot file could not be written
    #[error("cannot write snapshot {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}
