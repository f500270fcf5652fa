//! Observer session state machine
//!
//! Drives one observer from validation to close.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use tokio::time::{self, MissedTickBehavior};

use crate::registry::{RegistryError, TopicId, TopicRegistry};

use super::config::ObserverConfig;
use super::sink::TallySink;

/// Observer session lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObserverPhase {
    /// Topic validated, no tally pushed yet
    Init,
    /// Pushing tallies on every tick
    Active,
    /// Session finished
    Closed,
}

/// Why a session reached `Closed`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// The topic was soft-deleted
    TopicDeleted,
    /// A push failed because the observer went away
    Disconnected,
    /// A push did not complete within the configured timeout
    TimedOut,
    /// The observer closed its end of the connection
    ObserverLeft,
}

/// Outcome of a finished session
#[derive(Debug, Clone)]
pub struct SessionSummary {
    pub session_id: u64,
    pub topic_id: TopicId,
    /// Number of tallies successfully delivered
    pub pushes: u64,
    pub reason: CloseReason,
}

/// Streams the tally of one topic to one observer
#[derive(Debug)]
pub struct ObserverSession {
    session_id: u64,
    topic_id: TopicId,
    registry: Arc<TopicRegistry>,
    config: ObserverConfig,
    phase: ObserverPhase,
    pushes: u64,
    opened_at: Instant,
}

impl ObserverSession {
    /// Open a session for `topic_id`
    ///
    /// Fails with `NotFound` if the topic does not exist, in which case the
    /// observer connection should be rejected.
    pub async fn open(
        session_id: u64,
        topic_id: TopicId,
        registry: Arc<TopicRegistry>,
        config: ObserverConfig,
    ) -> Result<Self, RegistryError> {
        registry.tally(topic_id).await?;

        tracing::debug!(session_id = session_id, topic_id = topic_id, "Observer session opened");

        Ok(Self {
            session_id,
            topic_id,
            registry,
            config,
            phase: ObserverPhase::Init,
            pushes: 0,
            opened_at: Instant::now(),
        })
    }

    /// Get the current phase
    pub fn phase(&self) -> ObserverPhase {
        self.phase
    }

    /// Get the observed topic
    pub fn topic_id(&self) -> TopicId {
        self.topic_id
    }

    /// Push tallies to `sink` until the topic is deleted or the sink fails
    ///
    /// The first push happens immediately, then one per tick. Every tick
    /// re-reads the registry, so a deleted topic gets no further pushes.
    pub async fn run<S: TallySink>(self, sink: S) -> SessionSummary {
        self.run_until(sink, std::future::pending()).await
    }

    /// Like [`run`](Self::run), but also stops as soon as `left` resolves
    ///
    /// Transports that can tell when the observer hangs up pass that signal
    /// here so the session ends without waiting for a push to fail.
    pub async fn run_until<S, F>(mut self, mut sink: S, left: F) -> SessionSummary
    where
        S: TallySink,
        F: Future<Output = ()> + Send,
    {
        self.phase = ObserverPhase::Active;

        let mut ticker = time::interval(self.config.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tokio::pin!(left);

        let reason = loop {
            // First tick completes immediately
            tokio::select! {
                _ = ticker.tick() => {}
                _ = &mut left => break CloseReason::ObserverLeft,
            }

            let tally = match self.registry.tally(self.topic_id).await {
                Ok(tally) if !tally.deleted => tally,
                _ => break CloseReason::TopicDeleted,
            };

            match time::timeout(
                self.config.push_timeout,
                sink.send(self.topic_id, &tally.votes),
            )
            .await
            {
                Ok(Ok(())) => self.pushes += 1,
                Ok(Err(_)) => break CloseReason::Disconnected,
                Err(_) => break CloseReason::TimedOut,
            }
        };

        self.close(reason)
    }

    fn close(mut self, reason: CloseReason) -> SessionSummary {
        self.phase = ObserverPhase::Closed;

        tracing::debug!(
            session_id = self.session_id,
            topic_id = self.topic_id,
            pushes = self.pushes,
            reason = ?reason,
            duration_ms = self.opened_at.elapsed().as_millis() as u64,
            "Observer session closed"
        );

        SessionSummary {
            session_id: self.session_id,
            topic_id: self.topic_id,
            pushes: self.pushes,
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::sync::{mpsc, oneshot};

    use super::*;
    use crate::registry::TopicForm;
    use crate::session::sink::Disconnected;

    /// Sink whose pushes never complete
    struct StalledSink;

    impl TallySink for StalledSink {
        async fn send(&mut self, _topic_id: TopicId, _tally: &[u64]) -> Result<(), Disconnected> {
            std::future::pending().await
        }
    }

    async fn registry_with_topic() -> (Arc<TopicRegistry>, TopicId) {
        let registry = Arc::new(TopicRegistry::new());
        let topic = registry.create(TopicForm::new("A vs B", ["A", "B"])).await.unwrap();
        (registry, topic.id)
    }

    #[tokio::test]
    async fn test_open_unknown_topic_rejected() {
        let registry = Arc::new(TopicRegistry::new());

        let result = ObserverSession::open(1, 42, registry, ObserverConfig::default()).await;
        assert!(matches!(result, Err(RegistryError::NotFound(42))));
    }

    #[tokio::test]
    async fn test_open_starts_in_init() {
        let (registry, topic_id) = registry_with_topic().await;

        let session = ObserverSession::open(1, topic_id, registry, ObserverConfig::default())
            .await
            .unwrap();
        assert_eq!(session.phase(), ObserverPhase::Init);
        assert_eq!(session.topic_id(), topic_id);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pushes_immediately_then_on_tick() {
        let (registry, topic_id) = registry_with_topic().await;
        let session = ObserverSession::open(1, topic_id, Arc::clone(&registry), ObserverConfig::default())
            .await
            .unwrap();

        let (tx, mut rx) = mpsc::channel(16);
        let handle = tokio::spawn(session.run(tx));

        assert_eq!(rx.recv().await.unwrap(), vec![0, 0]);

        registry.vote(topic_id, 1).await.unwrap();
        assert_eq!(rx.recv().await.unwrap(), vec![0, 1]);

        drop(rx);
        let summary = handle.await.unwrap();
        assert_eq!(summary.reason, CloseReason::Disconnected);
        assert_eq!(summary.pushes, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_closes_session() {
        let (registry, topic_id) = registry_with_topic().await;
        let session = ObserverSession::open(7, topic_id, Arc::clone(&registry), ObserverConfig::default())
            .await
            .unwrap();

        let (tx, mut rx) = mpsc::channel(16);
        let handle = tokio::spawn(session.run(tx));

        // Let a few ticks go by
        for _ in 0..3 {
            rx.recv().await.unwrap();
        }

        assert!(registry.delete(topic_id).await);

        let summary = handle.await.unwrap();
        assert_eq!(summary.reason, CloseReason::TopicDeleted);
        assert_eq!(summary.session_id, 7);

        // At most one tally may have been in flight when the delete landed
        let mut after_delete = 0;
        while rx.recv().await.is_some() {
            after_delete += 1;
        }
        assert!(after_delete <= 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deleted_before_run_pushes_nothing() {
        let (registry, topic_id) = registry_with_topic().await;
        let session = ObserverSession::open(1, topic_id, Arc::clone(&registry), ObserverConfig::default())
            .await
            .unwrap();
        registry.delete(topic_id).await;

        let (tx, mut rx) = mpsc::channel(16);
        let summary = session.run(tx).await;

        assert_eq!(summary.reason, CloseReason::TopicDeleted);
        assert_eq!(summary.pushes, 0);
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_push_times_out() {
        let (registry, topic_id) = registry_with_topic().await;
        let config = ObserverConfig::default().push_timeout(Duration::from_secs(3));
        let session = ObserverSession::open(1, topic_id, registry, config).await.unwrap();

        let started = time::Instant::now();
        let summary = session.run(StalledSink).await;

        assert_eq!(summary.reason, CloseReason::TimedOut);
        assert_eq!(summary.pushes, 0);
        assert!(started.elapsed() >= Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_observer_leaving_ends_session() {
        let (registry, topic_id) = registry_with_topic().await;
        let session = ObserverSession::open(3, topic_id, Arc::clone(&registry), ObserverConfig::default())
            .await
            .unwrap();

        let (tx, mut rx) = mpsc::channel(16);
        let (left_tx, left_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(session.run_until(tx, async move {
            let _ = left_rx.await;
        }));

        assert_eq!(rx.recv().await.unwrap(), vec![0, 0]);
        left_tx.send(()).unwrap();

        let summary = handle.await.unwrap();
        assert_eq!(summary.reason, CloseReason::ObserverLeft);
        assert_eq!(summary.pushes, 1);

        // The topic itself is untouched
        assert!(!registry.tally(topic_id).await.unwrap().deleted);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tallies_never_go_backwards() {
        let (registry, topic_id) = registry_with_topic().await;
        let session = ObserverSession::open(1, topic_id, Arc::clone(&registry), ObserverConfig::default())
            .await
            .unwrap();

        let (tx, mut rx) = mpsc::channel(64);
        let handle = tokio::spawn(session.run(tx));

        let voter = {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move {
                for i in 0..20 {
                    registry.vote(topic_id, i % 2).await.unwrap();
                    time::sleep(Duration::from_millis(300)).await;
                }
                registry.delete(topic_id).await;
            })
        };

        let mut previous = vec![0, 0];
        while let Some(tally) = rx.recv().await {
            assert!(tally.iter().zip(&previous).all(|(now, before)| now >= before));
            previous = tally;
        }

        voter.await.unwrap();
        assert_eq!(handle.await.unwrap().reason, CloseReason::TopicDeleted);
    }
}
