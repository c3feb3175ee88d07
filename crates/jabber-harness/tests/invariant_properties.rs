//! Property-based tests over whole clusters.
//!
//! Arbitrary interleavings of user input, clock movement and server-side
//! disconnects are replayed against three clients. The standard invariants
//! are checked on every render; once the cluster is quiet, every connected
//! client must agree with the server.

use std::time::Duration;

use jabber_app::KeyInput;
use jabber_client::Phase;
use jabber_harness::{ChatCluster, InvariantRegistry};
use proptest::prelude::*;

const CLIENTS: usize = 3;

#[derive(Debug, Clone)]
enum Op {
    Line(usize, &'static str),
    Key(usize, KeyInput),
    Advance(u64),
    Kick(usize),
    Step,
    Settle,
}

fn line() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![
        "hello",
        "hi there",
        "alice",
        "bob",
        "/connect alice",
        "/connect carol",
        "/disconnect",
        "/nick x",
        "   ",
    ])
}

fn key() -> impl Strategy<Value = KeyInput> {
    prop_oneof![
        Just(KeyInput::Char('a')),
        Just(KeyInput::Backspace),
        Just(KeyInput::Left),
        Just(KeyInput::Up),
    ]
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0..CLIENTS, line()).prop_map(|(client, text)| Op::Line(client, text)),
        2 => (0..CLIENTS, key()).prop_map(|(client, key)| Op::Key(client, key)),
        2 => (0u64..5000).prop_map(Op::Advance),
        1 => (0..CLIENTS).prop_map(Op::Kick),
        2 => Just(Op::Step),
        2 => Just(Op::Settle),
    ]
}

async fn replay(ops: Vec<Op>) -> ChatCluster {
    let mut cluster = ChatCluster::new().with_invariants();
    for user in ["alice", "bob", "carol"] {
        cluster.add_client(Some(user)).await.unwrap();
    }

    for op in ops {
        match op {
            Op::Line(client, text) => cluster.type_line(client, text),
            Op::Key(client, key) => cluster.key(client, key),
            Op::Advance(ms) => cluster.advance(Duration::from_millis(ms)),
            Op::Kick(client) => {
                let identity = cluster.snapshot(client).local_identity.clone();
                let conn = identity.and_then(|identity| cluster.server().conn_of(&identity));
                if let Some(conn) = conn {
                    cluster.server().kick(conn);
                }
            },
            Op::Step => cluster.step_all().await.unwrap(),
            Op::Settle => cluster.settle().await.unwrap(),
        }
    }

    cluster.settle().await.unwrap();
    cluster
}

fn run(ops: Vec<Op>) -> ChatCluster {
    tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(replay(ops))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn invariants_hold_and_clients_converge(ops in prop::collection::vec(op(), 0..24)) {
        let cluster = run(ops);

        InvariantRegistry::standard().assert_all(&cluster.system_snapshot(), "after settle");

        let users = cluster.server().users();
        let history: Vec<String> =
            cluster.server().history().iter().map(|record| record.id.clone()).collect();

        for index in 0..cluster.len() {
            let snapshot = cluster.snapshot(index);
            prop_assert_ne!(snapshot.phase, Phase::Connecting);
            if snapshot.phase == Phase::Connected {
                prop_assert_eq!(&snapshot.presence, &users);
                prop_assert!(snapshot.messages.iter().all(|message| history.contains(&message.id)));
                let local = snapshot.local_identity.as_deref().unwrap();
                prop_assert!(users.iter().any(|user| user == local));
            }
        }
    }

    #[test]
    fn server_readers_never_include_sender(ops in prop::collection::vec(op(), 0..24)) {
        let cluster = run(ops);
        let server = cluster.server();

        for record in server.history() {
            prop_assert!(!server.readers(&record.id).contains(&record.sender));
        }
    }
}
