//! WebSocket transport for the client.
//!
//! Provides [`WebSocketTransport`] which moves text frames between a
//! WebSocket and a pair of channels. This is a thin layer: protocol logic
//! stays in the Sans-IO [`crate::Client`].

use futures_util::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};

/// Outgoing queue depth.
const CHANNEL_CAPACITY: usize = 64;

/// Transport errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection failed.
    #[error("connection failed: {0}")]
    Connection(String),

    /// Transport already closed.
    #[error("transport closed")]
    Closed,
}

/// Something the socket reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Incoming {
    /// A text frame.
    Frame(String),
    /// The socket closed or failed. Nothing follows.
    Closed {
        /// Human-readable cause.
        reason: String,
    },
}

/// Handle to an open WebSocket.
///
/// Frames are sent and received via channels; an internal task owns the
/// socket.
#[derive(Debug)]
pub struct WebSocketTransport {
    to_server: mpsc::Sender<String>,
    from_server: mpsc::Receiver<Incoming>,
    abort_handle: tokio::task::AbortHandle,
}

impl WebSocketTransport {
    /// Queue a text frame for the server.
    pub async fn send(&self, text: String) -> Result<(), TransportError> {
        self.to_server.send(text).await.map_err(|_| TransportError::Closed)
    }

    /// Next thing the socket reported.
    ///
    /// Returns `Incoming::Closed` once, then `None`.
    pub async fn recv(&mut self) -> Option<Incoming> {
        self.from_server.recv().await
    }

    /// Close gracefully: queued frames are flushed, then a close frame is
    /// sent.
    pub fn close(self) {
        drop(self.to_server);
    }

    /// Stop the connection immediately.
    pub fn stop(&self) {
        self.abort_handle.abort();
    }
}

/// Connect to a Jabber server at a `ws://` or `wss://` URL.
pub async fn connect(url: &str) -> Result<WebSocketTransport, TransportError> {
    let (stream, _response) =
        connect_async(url).await.map_err(|e| TransportError::Connection(e.to_string()))?;

    let (to_server_tx, to_server_rx) = mpsc::channel::<String>(CHANNEL_CAPACITY);
    let (from_server_tx, from_server_rx) = mpsc::channel::<Incoming>(CHANNEL_CAPACITY);

    let handle = tokio::spawn(run_connection(stream, to_server_rx, from_server_tx));

    Ok(WebSocketTransport {
        to_server: to_server_tx,
        from_server: from_server_rx,
        abort_handle: handle.abort_handle(),
    })
}

/// Run the connection, bridging between channels and the socket.
async fn run_connection<S>(
    stream: S,
    mut to_server: mpsc::Receiver<String>,
    from_server: mpsc::Sender<Incoming>,
) where
    S: futures_util::Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>>
        + futures_util::Sink<Message, Error = tokio_tungstenite::tungstenite::Error>
        + Unpin,
{
    let (mut sink, mut source) = stream.split();

    let reason = loop {
        tokio::select! {
            outgoing = to_server.recv() => match outgoing {
                Some(text) => {
                    if let Err(e) = sink.send(Message::text(text)).await {
                        break format!("write failed: {e}");
                    }
                },
                None => {
                    let _ = sink.send(Message::Close(None)).await;
                    break "closed locally".to_string();
                },
            },
            incoming = source.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    if from_server.send(Incoming::Frame(text.as_str().to_owned())).await.is_err() {
                        break "receiver dropped".to_string();
                    }
                },
                Some(Ok(Message::Close(frame))) => {
                    break frame.map_or_else(
                        || "closed by server".to_string(),
                        |frame| format!("closed by server: {}", frame.reason.as_str()),
                    );
                },
                Some(Ok(other)) => {
                    tracing::debug!(?other, "ignoring non-text websocket message");
                },
                Some(Err(e)) => break format!("read failed: {e}"),
                None => break "stream ended".to_string(),
            },
        }
    };

    tracing::debug!(%reason, "websocket task finished");
    let _ = from_server.send(Incoming::Closed { reason }).await;
}
