//! Persistence driver implementation

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::registry::TopicRegistry;
use crate::snapshot::SnapshotStore;

/// Counters reported when the driver stops
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PersistenceStats {
    /// Successful saves, the final one included
    pub saves: u64,
    /// Saves that failed and were skipped
    pub failures: u64,
}

/// Saves the registry to a snapshot store on a fixed interval
#[derive(Debug)]
pub struct PersistenceDriver {
    registry: Arc<TopicRegistry>,
    store: SnapshotStore,
    interval: Duration,
    stats: PersistenceStats,
}

impl PersistenceDriver {
    /// Create a driver; nothing runs until `spawn`
    pub fn new(registry: Arc<TopicRegistry>, store: SnapshotStore, interval: Duration) -> Self {
        Self {
            registry,
            store,
            interval,
            stats: PersistenceStats::default(),
        }
    }

    /// Save the registry once
    ///
    /// Failures are logged and counted, never propagated: the next tick
    /// simply tries again.
    pub async fn save_once(&mut self) -> bool {
        match self.store.save_registry(&self.registry).await {
            Ok(()) => {
                self.stats.saves += 1;
                true
            }
            Err(e) => {
                self.stats.failures += 1;
                tracing::error!(
                    path = %self.store.path().display(),
                    error = %e,
                    failures = self.stats.failures,
                    "Snapshot save failed"
                );
                false
            }
        }
    }

    /// Spawn the background save loop
    ///
    /// The first save happens one interval after spawning. Calling
    /// `PersistenceHandle::shutdown`, or dropping the handle, stops the loop
    /// after a final save.
    pub fn spawn(mut self) -> PersistenceHandle {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            let start = time::Instant::now() + self.interval;
            let mut ticker = time::interval_at(start, self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            tracing::info!(
                path = %self.store.path().display(),
                interval_secs = self.interval.as_secs_f64(),
                "Persistence driver started"
            );

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        self.save_once().await;
                    }
                    _ = &mut shutdown_rx => break,
                }
            }

            if self.save_once().await {
                let topics = self.registry.len().await;
                tracing::info!(
                    path = %self.store.path().display(),
                    topics = topics,
                    "Final snapshot saved"
                );
            }

            self.stats
        });

        PersistenceHandle {
            shutdown_tx: Some(shutdown_tx),
            task,
        }
    }
}

/// Handle to a running persistence driver
#[derive(Debug)]
pub struct PersistenceHandle {
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<PersistenceStats>,
}

impl PersistenceHandle {
    /// Stop the driver and wait for its final save
    pub async fn shutdown(mut self) -> Result<PersistenceStats, tokio::task::JoinError> {
        if let Some(tx) = self.shutdown_tx.take() {
            // Receiver only disappears if the task already ended
            let _ = tx.send(());
        }
        (&mut self.task).await
    }
}
