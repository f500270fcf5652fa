//! WebSocket transport for observer sessions

use std::future::Future;

use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};

use crate::registry::TopicId;
use crate::session::{Disconnected, TallySink};

/// Sends each tally as a JSON array in a text frame
pub struct WsSink {
    sender: SplitSink<WebSocket, Message>,
}

impl WsSink {
    /// Split `socket` into a sink and a future that resolves once the
    /// observer closes the connection
    pub fn split(socket: WebSocket) -> (Self, impl Future<Output = ()> + Send) {
        let (sender, receiver) = socket.split();
        (Self { sender }, observer_left(receiver))
    }

    /// Send a close frame; errors are ignored since the peer may be gone
    pub async fn close(mut self) {
        let _ = self.sender.send(Message::Close(None)).await;
    }
}

impl TallySink for WsSink {
    async fn send(&mut self, _topic_id: TopicId, tally: &[u64]) -> Result<(), Disconnected> {
        let text = serde_json::to_string(tally).map_err(|_| Disconnected)?;

        self.sender
            .send(Message::Text(text.into()))
            .await
            .map_err(|_| Disconnected)
    }
}

/// Drain inbound frames until a close frame, a read error or end of stream
///
/// Observers never send anything meaningful; reading keeps ping replies
/// flowing.
async fn observer_left(mut receiver: SplitStream<WebSocket>) {
    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Close(_)) | Err(_) => break,
            Ok(_) => {}
        }
    }
}
