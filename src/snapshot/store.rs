//! Snapshot file store

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::registry::{Topic, TopicId, TopicRegistry};

use super::error::SnapshotError;

/// Reads and writes registry snapshots at a fixed path
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    /// Create a store backed by `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the backing file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load every topic from the snapshot file
    ///
    /// A missing, unreadable or malformed file is an error; there is no
    /// fallback to an empty topic list.
    pub async fn load(&self) -> Result<Vec<Topic>, SnapshotError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|source| SnapshotError::Read {
                path: self.path.clone(),
                source,
            })?;

        let topics: Vec<Topic> =
            serde_json::from_slice(&bytes).map_err(|source| SnapshotError::Decode {
                path: self.path.clone(),
                source,
            })?;

        self.validate(&topics)?;

        tracing::info!(
            path = %self.path.display(),
            topics = topics.len(),
            "Snapshot loaded"
        );

        Ok(topics)
    }

    /// Overwrite the snapshot file with `topics`
    pub async fn save(&self, topics: &[Topic]) -> Result<(), SnapshotError> {
        let bytes = serde_json::to_vec(topics).map_err(SnapshotError::Encode)?;

        tokio::fs::write(&self.path, &bytes)
            .await
            .map_err(|source| SnapshotError::Write {
                path: self.path.clone(),
                source,
            })?;

        tracing::debug!(
            path = %self.path.display(),
            topics = topics.len(),
            bytes = bytes.len(),
            "Snapshot saved"
        );

        Ok(())
    }

    /// Take a consistent copy of the registry and save it
    pub async fn save_registry(&self, registry: &TopicRegistry) -> Result<(), SnapshotError> {
        let topics = registry.snapshot().await;
        self.save(&topics).await
    }

    fn validate(&self, topics: &[Topic]) -> Result<(), SnapshotError> {
        let mut seen = HashSet::with_capacity(topics.len());

        for topic in topics {
            if !topic.is_well_formed() {
                return Err(self.invalid(topic, "vote count does not match choice count"));
            }
            if topic.id == TopicId::MAX {
                return Err(self.invalid(topic, "id space exhausted"));
            }
            if !seen.insert(topic.id) {
                return Err(self.invalid(topic, "duplicate id"));
            }
        }

        Ok(())
    }

    fn invalid(&self, topic: &Topic, reason: &'static str) -> SnapshotError {
        SnapshotError::InvalidTopic {
            path: self.path.clone(),
            id: topic.id,
            reason,
        }
    }
}
