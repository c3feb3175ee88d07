//! Snapshot tests of what a user sees after scripted sessions.
//!
//! The virtual clock never moves in these scripts, so every server
//! timestamp is `00:00:00` and the output is stable.

use jabber_harness::ChatCluster;

#[tokio::test]
async fn solo_session_after_one_message() {
    let mut cluster = ChatCluster::new().with_invariants();
    cluster.add_client(Some("alice")).await.unwrap();
    cluster.type_line(0, "hi");
    cluster.settle().await.unwrap();

    insta::assert_json_snapshot!(cluster.snapshot(0), @r#"
    {
      "phase": "connected",
      "local_identity": "alice",
      "messages": [
        {
          "id": "m1",
          "sender": "System",
          "timestamp": "00:00:00",
          "text": "alice joined the chat",
          "read_by": [
            "alice"
          ]
        },
        {
          "id": "m2",
          "sender": "alice",
          "timestamp": "00:00:00",
          "text": "hi",
          "read_by": []
        }
      ],
      "presence": [
        "alice"
      ],
      "typing": []
    }
    "#);
}

#[tokio::test]
async fn observer_view_of_a_conversation() {
    let mut cluster = ChatCluster::new().with_invariants();
    cluster.add_client(Some("alice")).await.unwrap();
    cluster.settle().await.unwrap();
    cluster.add_client(Some("bob")).await.unwrap();
    cluster.settle().await.unwrap();

    cluster.type_line(1, "hey alice");
    cluster.settle().await.unwrap();

    insta::assert_json_snapshot!(cluster.snapshot(0), {
        ".messages[].timestamp" => "[time]",
    }, @r#"
    {
      "phase": "connected",
      "local_identity": "alice",
      "messages": [
        {
          "id": "m1",
          "sender": "System",
          "timestamp": "[time]",
          "text": "alice joined the chat",
          "read_by": [
            "alice",
            "bob"
          ]
        },
        {
          "id": "m2",
          "sender": "System",
          "timestamp": "[time]",
          "text": "bob joined the chat",
          "read_by": [
            "alice",
            "bob"
          ]
        },
        {
          "id": "m3",
          "sender": "bob",
          "timestamp": "[time]",
          "text": "hey alice",
          "read_by": [
            "alice"
          ]
        }
      ],
      "presence": [
        "alice",
        "bob"
      ],
      "typing": []
    }
    "#);
}
