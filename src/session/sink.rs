//! Tally push primitive

use std::future::Future;

use thiserror::Error;
use tokio::sync::mpsc;

use crate::registry::TopicId;

/// The observer is gone and can no longer receive tallies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("observer disconnected")]
pub struct Disconnected;

/// Transport that delivers vote tallies to one observer
pub trait TallySink: Send {
    /// Push the current tally of `topic_id`
    fn send(
        &mut self,
        topic_id: TopicId,
        tally: &[u64],
    ) -> impl Future<Output = Result<(), Disconnected>> + Send;
}

/// In-process observers receive tallies over a channel
impl TallySink for mpsc::Sender<Vec<u64>> {
    async fn send(&mut self, _topic_id: TopicId, tally: &[u64]) -> Result<(), Disconnected> {
        mpsc::Sender::send(self, tally.to_vec())
            .await
            .map_err(|_| Disconnected)
    }
}

impl<T: TallySink> TallySink for &mut T {
    fn send(
        &mut self,
        topic_id: TopicId,
        tally: &[u64],
    ) -> impl Future<Output = Result<(), Disconnected>> + Send {
        TallySink::send(&mut **self, topic_id, tally)
    }
}
