//! Transport integration tests against a loopback WebSocket server.
//!
//! Requires the `transport` feature.

#![cfg(feature = "transport")]

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use jabber_client::transport::{self, Incoming, TransportError};
use tokio::net::TcpListener;
use tokio_tungstenite::{accept_async, tungstenite::Message};

/// Accept one connection, answer `CONNECT:<name>` with `CONNECTED:<name>`,
/// echo every other text frame, and close after `DISCONNECT`.
async fn loopback_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();

        while let Some(Ok(message)) = ws.next().await {
            let Message::Text(text) = message else { continue };
            let text = text.as_str().to_owned();

            if let Some(name) = text.strip_prefix("CONNECT:") {
                ws.send(Message::text(format!("CONNECTED:{name}"))).await.unwrap();
            } else if text.starts_with("DISCONNECT:") {
                ws.close(None).await.unwrap();
                break;
            } else {
                ws.send(Message::text(text)).await.unwrap();
            }
        }
    });

    format!("ws://{addr}")
}

async fn next(transport: &mut transport::WebSocketTransport) -> Incoming {
    tokio::time::timeout(Duration::from_secs(5), transport.recv())
        .await
        .expect("transport timed out")
        .expect("transport channel closed")
}

#[tokio::test]
async fn handshake_and_echo() {
    let url = loopback_server().await;
    let mut ws = transport::connect(&url).await.unwrap();

    ws.send("CONNECT:alice".into()).await.unwrap();
    assert_eq!(next(&mut ws).await, Incoming::Frame("CONNECTED:alice".into()));

    ws.send("MESSAGE:ratio 1:2".into()).await.unwrap();
    assert_eq!(next(&mut ws).await, Incoming::Frame("MESSAGE:ratio 1:2".into()));
}

#[tokio::test]
async fn server_close_is_reported_once() {
    let url = loopback_server().await;
    let mut ws = transport::connect(&url).await.unwrap();

    ws.send("DISCONNECT:alice".into()).await.unwrap();

    assert!(matches!(next(&mut ws).await, Incoming::Closed { .. }));
    assert!(ws.recv().await.is_none());
}

#[tokio::test]
async fn connect_to_nothing_fails() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let result = transport::connect(&format!("ws://{addr}")).await;

    assert!(matches!(result, Err(TransportError::Connection(_))));
}
