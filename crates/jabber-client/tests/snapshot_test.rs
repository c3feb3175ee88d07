//! Snapshot tests for the observable chat state.
//!
//! Pins the exact shape observers receive after a representative session:
//! message order, filtered read receipts, server-ordered presence, and the
//! typing set.

use jabber_client::{Client, ClientConfig, ClientEvent, TransportId};

fn session(frames: &[&str]) -> (Client, TransportId) {
    let mut client = Client::new(ClientConfig::default());
    client.handle(ClientEvent::Connect { identity: "alice".into() }).unwrap();
    let transport = client.transport().unwrap();
    client.handle(ClientEvent::TransportOpened { transport }).unwrap();
    for text in frames {
        client.handle(ClientEvent::FrameReceived { transport, text: (*text).into() }).unwrap();
    }
    (client, transport)
}

#[test]
fn snapshot_after_busy_session() {
    let (client, _) = session(&[
        "CONNECTED:alice",
        "MESSAGES:m1::System::10:00::bob joined",
        "USERS:alice, ,bob",
        "NEW_MESSAGE:m2::alice::10:01::hi::all",
        "NEW_MESSAGE:m2::alice::10:01::hi::all",
        "READ_UPDATE:m2::bob,alice",
        "READ_UPDATE:m9::bob",
        "TYPING:bob,true",
        "TYPING:alice,true",
        "PING:unknown",
    ]);

    insta::assert_json_snapshot!(client.snapshot(), @r#"
    {
      "phase": "connected",
      "local_identity": "alice",
      "messages": [
        {
          "id": "m1",
          "sender": "System",
          "timestamp": "10:00",
          "text": "bob joined",
          "read_by": []
        },
        {
          "id": "m2",
          "sender": "alice",
          "timestamp": "10:01",
          "text": "hi::all",
          "read_by": [
            "bob"
          ]
        }
      ],
      "presence": [
        "alice",
        "bob"
      ],
      "typing": [
        "bob"
      ]
    }
    "#);
}

#[test]
fn snapshot_after_transport_loss() {
    let (mut client, transport) = session(&[
        "CONNECTED:alice",
        "NEW_MESSAGE:m1::bob::10:00::hello",
        "USERS:alice,bob",
        "TYPING:bob,true",
    ]);

    client.handle(ClientEvent::TransportClosed { transport, reason: "reset".into() }).unwrap();

    insta::assert_json_snapshot!(client.snapshot(), @r#"
    {
      "phase": "disconnected",
      "local_identity": null,
      "messages": [],
      "presence": [],
      "typing": []
    }
    "#);
}

#[test]
fn snapshot_while_connecting() {
    let (client, _) = session(&["USERS:carol"]);

    insta::assert_json_snapshot!(client.snapshot(), @r#"
    {
      "phase": "connecting",
      "local_identity": "alice",
      "messages": [],
      "presence": [
        "carol"
      ],
      "typing": []
    }
    "#);
}
