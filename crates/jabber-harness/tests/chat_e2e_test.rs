//! End-to-end chat scenarios.
//!
//! # Test Strategy
//!
//! Each test drives the production Runtime (App → Bridge → Client) for one
//! or more users against the in-memory server:
//! 1. Type input lines or single keys
//! 2. Step every client until the cluster is quiet
//! 3. Verify what each user would see
//!
//! # Oracle Pattern
//!
//! Tests end with oracle checks that verify:
//! - Each App shows the expected session, messages and presence
//! - Server state agrees with what clients display
//! - The standard invariants hold for every client

use std::time::Duration;

use jabber_app::KeyInput;
use jabber_client::{ChatSnapshot, Phase};
use jabber_harness::{ChatCluster, InvariantRegistry};

async fn cluster_with(users: &[&str]) -> ChatCluster {
    let mut cluster = ChatCluster::new().with_invariants();
    for user in users {
        cluster.add_client(Some(user)).await.unwrap();
    }
    cluster.settle().await.unwrap();
    cluster
}

fn texts(snapshot: &ChatSnapshot) -> Vec<&str> {
    snapshot.messages.iter().map(|message| message.text.as_str()).collect()
}

fn assert_invariants(cluster: &ChatCluster) {
    InvariantRegistry::standard().assert_all(&cluster.system_snapshot(), "at end of test");
}

#[tokio::test]
async fn two_users_chat_and_read() {
    let mut cluster = cluster_with(&["alice", "bob"]).await;

    cluster.type_line(0, "hello bob");
    cluster.settle().await.unwrap();

    let alice = cluster.snapshot(0);
    let bob = cluster.snapshot(1);
    let sent = alice.messages.last().unwrap();
    assert_eq!(sent.sender, "alice");
    assert_eq!(sent.text, "hello bob");
    assert!(sent.read_by.contains("bob"));
    assert_eq!(bob.messages.last().unwrap().id, sent.id);

    assert_eq!(alice.presence, ["alice", "bob"]);
    assert_eq!(bob.presence, ["alice", "bob"]);
    assert!(bob.typing.is_empty());
    assert_eq!(cluster.server().readers(&sent.id), ["bob"]);
    assert_invariants(&cluster);
}

#[tokio::test]
async fn taken_name_is_renamed_by_server() {
    let cluster = cluster_with(&["alice", "alice"]).await;

    let second = cluster.snapshot(1);
    assert_eq!(second.phase, Phase::Connected);
    assert_eq!(second.local_identity.as_deref(), Some("alice_2"));
    assert_eq!(cluster.app(1).status_message(), Some("Connected as alice_2"));
    assert_eq!(cluster.snapshot(0).presence, ["alice", "alice_2"]);
    assert_invariants(&cluster);
}

#[tokio::test]
async fn late_joiner_receives_history_once() {
    let mut cluster = cluster_with(&["alice"]).await;
    cluster.type_line(0, "first");
    cluster.settle().await.unwrap();

    cluster.add_client(Some("bob")).await.unwrap();
    cluster.settle().await.unwrap();

    let bob = cluster.snapshot(1);
    assert_eq!(texts(bob), ["alice joined the chat", "first", "bob joined the chat"]);
    assert_invariants(&cluster);
}

#[tokio::test]
async fn typing_indicator_clears_after_quiet_period() {
    let mut cluster = cluster_with(&["alice", "bob"]).await;

    cluster.key(0, KeyInput::Char('h'));
    cluster.key(0, KeyInput::Char('i'));
    cluster.settle().await.unwrap();
    assert_eq!(cluster.snapshot(1).typing, ["alice"]);
    assert_eq!(cluster.snapshot(1).typing_line().as_deref(), Some("alice is typing..."));

    cluster.advance(Duration::from_millis(2999));
    cluster.settle().await.unwrap();
    assert_eq!(cluster.snapshot(1).typing, ["alice"]);

    cluster.advance(Duration::from_millis(1));
    cluster.settle().await.unwrap();
    assert!(cluster.snapshot(1).typing.is_empty());
    assert_eq!(cluster.app(0).input().as_str(), "hi");
}

#[tokio::test]
async fn sending_clears_typing_immediately() {
    let mut cluster = cluster_with(&["alice", "bob"]).await;

    cluster.type_line(0, "yo");
    cluster.settle().await.unwrap();

    assert!(cluster.snapshot(1).typing.is_empty());
    assert_eq!(texts(cluster.snapshot(1)).last(), Some(&"yo"));
}

#[tokio::test]
async fn server_drop_tears_down_session() {
    let mut cluster = cluster_with(&["alice", "bob"]).await;
    cluster.key(1, KeyInput::Char('x'));
    cluster.settle().await.unwrap();

    let conn = cluster.server().conn_of("alice").unwrap();
    cluster.server().kick(conn);
    cluster.settle().await.unwrap();

    assert_eq!(*cluster.snapshot(0), ChatSnapshot::default());
    assert_eq!(cluster.app(0).status_message(), Some("Disconnected"));
    assert_eq!(cluster.snapshot(1).presence, ["bob"]);
    assert_eq!(texts(cluster.snapshot(1)).last(), Some(&"alice left the chat"));
    assert_invariants(&cluster);
}

#[tokio::test]
async fn disconnect_command_leaves_chat() {
    let mut cluster = cluster_with(&["alice", "bob"]).await;

    cluster.type_line(0, "/disconnect");
    cluster.settle().await.unwrap();

    assert_eq!(*cluster.snapshot(0), ChatSnapshot::default());
    assert_eq!(cluster.server().users(), ["bob"]);
    assert_eq!(cluster.snapshot(1).presence, ["bob"]);
    assert_invariants(&cluster);
}

#[tokio::test]
async fn reconnect_under_new_name() {
    let mut cluster = cluster_with(&["alice", "bob"]).await;

    cluster.type_line(0, "/connect carol");
    cluster.settle().await.unwrap();

    let carol = cluster.snapshot(0);
    assert_eq!(carol.local_identity.as_deref(), Some("carol"));
    assert_eq!(carol.presence, ["bob", "carol"]);
    assert_eq!(cluster.snapshot(1).presence, ["bob", "carol"]);
    assert!(texts(cluster.snapshot(1)).contains(&"alice left the chat"));
    assert_invariants(&cluster);
}

#[tokio::test]
async fn plain_text_while_disconnected_is_the_username() {
    let mut cluster = ChatCluster::new().with_invariants();
    cluster.add_client(None).await.unwrap();
    cluster.settle().await.unwrap();
    assert_eq!(cluster.snapshot(0).phase, Phase::Disconnected);

    cluster.type_line(0, "dave");
    cluster.settle().await.unwrap();

    assert_eq!(cluster.snapshot(0).local_identity.as_deref(), Some("dave"));
    assert_eq!(cluster.server().users(), ["dave"]);
}

#[tokio::test]
async fn refused_connection_returns_to_disconnected() {
    let mut cluster = ChatCluster::new().with_invariants();
    cluster.add_client(None).await.unwrap();
    cluster.driver_mut(0).refuse_connections(true);

    cluster.type_line(0, "alice");
    cluster.settle().await.unwrap();

    assert_eq!(cluster.snapshot(0).phase, Phase::Disconnected);
    assert_eq!(cluster.app(0).status_message(), Some("Disconnected"));

    cluster.driver_mut(0).refuse_connections(false);
    cluster.type_line(0, "alice");
    cluster.settle().await.unwrap();
    assert_eq!(cluster.snapshot(0).phase, Phase::Connected);
}

#[tokio::test]
async fn quitting_closes_the_connection() {
    let mut cluster = cluster_with(&["alice", "bob"]).await;

    cluster.type_line(0, "/quit");
    cluster.settle().await.unwrap();

    assert!(cluster.has_quit(0));
    assert_eq!(cluster.snapshot(1).presence, ["bob"]);
}

#[tokio::test]
async fn garbage_from_server_is_ignored() {
    let mut cluster = cluster_with(&["alice"]).await;
    let conn = cluster.server().conn_of("alice").unwrap();

    {
        let mut server = cluster.server();
        server.inject(conn, "GARBAGE");
        server.inject(conn, "NEW_MESSAGE:");
        server.inject(conn, "CONNECTED:");
        server.inject(conn, "TYPING:alice,true");
    }
    cluster.settle().await.unwrap();

    let alice = cluster.snapshot(0);
    assert_eq!(alice.phase, Phase::Connected);
    assert!(alice.typing.is_empty());
    assert_eq!(texts(alice), ["alice joined the chat"]);
    assert_invariants(&cluster);
}

#[tokio::test]
async fn own_messages_are_never_receipted() {
    let mut cluster = cluster_with(&["alice"]).await;

    cluster.type_line(0, "note to self");
    cluster.settle().await.unwrap();

    let id = cluster.snapshot(0).messages.last().unwrap().id.clone();
    assert!(cluster.server().readers(&id).is_empty());
}
