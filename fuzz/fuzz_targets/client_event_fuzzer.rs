//! Fuzz target for the client engine
//!
//! Drives a `Client` with arbitrary event sequences: user intents, transport
//! callbacks for current and stale transports, raw inbound text, and clock
//! movement.
//!
//! # Invariants
//!
//! - NEVER panic, whatever the server sends or the order callbacks arrive in
//! - Local identity is present exactly when a session exists
//! - Disconnected means no messages, presence or typing peers
//! - The local user is never listed as typing
//! - Message ids stay unique and no sender reads their own message

#![no_main]

use std::{collections::HashSet, ops::Sub, time::Duration};

use arbitrary::Arbitrary;
use jabber_client::{Client, ClientConfig, ClientEvent, Phase, TransportId};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Ms(u64);

impl Sub for Ms {
    type Output = Duration;

    fn sub(self, rhs: Self) -> Duration {
        Duration::from_millis(self.0.saturating_sub(rhs.0))
    }
}

#[derive(Debug, Clone, Arbitrary)]
enum Op {
    Connect { identity: String },
    Disconnect,
    Opened { stale: bool },
    Closed { stale: bool },
    Frame { stale: bool, text: String },
    Known { frame: KnownFrame, who: u8 },
    Input,
    Send { text: String },
    Visible { id: u8 },
    Advance { millis: u16 },
}

/// Well-formed frames over a tiny id and identity space, so that ids and
/// names actually collide.
#[derive(Debug, Clone, Arbitrary)]
enum KnownFrame {
    Connected,
    NewMessage { id: u8 },
    ReadUpdate { id: u8, readers: Vec<u8> },
    Users { users: Vec<u8> },
    Typing { active: bool },
    History { ids: Vec<u8> },
}

const NAMES: [&str; 4] = ["alice", "bob", "carol", "System"];

fn name(n: u8) -> &'static str {
    NAMES[usize::from(n) % NAMES.len()]
}

fn render(frame: &KnownFrame, who: u8) -> String {
    let names = |list: &[u8]| list.iter().map(|n| name(*n)).collect::<Vec<_>>().join(",");
    match frame {
        KnownFrame::Connected => format!("CONNECTED:{}", name(who)),
        KnownFrame::NewMessage { id } => {
            format!("NEW_MESSAGE:m{}::{}::10:00:00::hi", id % 8, name(who))
        },
        KnownFrame::ReadUpdate { id, readers } => {
            format!("READ_UPDATE:m{}::{}", id % 8, names(readers))
        },
        KnownFrame::Users { users } => format!("USERS:{}", names(users)),
        KnownFrame::Typing { active } => format!("TYPING:{},{active}", name(who)),
        KnownFrame::History { ids } => {
            let records: Vec<String> =
                ids.iter().map(|id| format!("m{}::{}::10:00:00::old", id % 8, name(*id))).collect();
            format!("MESSAGES:{}", records.join("\n"))
        },
    }
}

fuzz_target!(|ops: Vec<Op>| {
    let mut client: Client<Ms> = Client::new(ClientConfig::default());
    let mut now = Ms(0);
    let dead = TransportId::new(u64::MAX);

    for op in ops {
        let current = client.transport().unwrap_or(dead);
        let pick = |stale: bool| if stale { dead } else { current };

        let event = match op {
            Op::Connect { identity } => ClientEvent::Connect { identity },
            Op::Disconnect => ClientEvent::Disconnect,
            Op::Opened { stale } => ClientEvent::TransportOpened { transport: pick(stale) },
            Op::Closed { stale } => {
                ClientEvent::TransportClosed { transport: pick(stale), reason: "fuzz".into() }
            },
            Op::Frame { stale, text } => ClientEvent::FrameReceived { transport: pick(stale), text },
            Op::Known { frame, who } => {
                ClientEvent::FrameReceived { transport: current, text: render(&frame, who) }
            },
            Op::Input => ClientEvent::InputChanged { now },
            Op::Send { text } => ClientEvent::SendMessage { text },
            Op::Visible { id } => ClientEvent::MessageVisible { message_id: format!("m{}", id % 8) },
            Op::Advance { millis } => {
                now = Ms(now.0 + u64::from(millis));
                ClientEvent::Tick { now }
            },
        };

        // Errors are expected; panics are not.
        let _ = client.handle(event);

        let snapshot = client.snapshot();
        let has_identity = snapshot.local_identity.as_deref().is_some_and(|id| !id.is_empty());
        assert_eq!(has_identity, snapshot.phase != Phase::Disconnected);

        if snapshot.phase == Phase::Disconnected {
            assert!(snapshot.messages.is_empty());
            assert!(snapshot.presence.is_empty());
            assert!(snapshot.typing.is_empty());
        }
        if let Some(local) = snapshot.local_identity.as_deref() {
            assert!(!snapshot.typing.iter().any(|peer| peer == local));
        }

        let mut ids = HashSet::new();
        for message in &snapshot.messages {
            assert!(ids.insert(message.id.clone()), "duplicate id {}", message.id);
            assert!(!message.read_by.contains(&message.sender));
        }
    }
});
