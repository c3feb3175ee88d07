//! In-memory reference server.
//!
//! `SimServer` speaks the server side of the wire protocol over per-connection
//! outboxes instead of sockets. Tests drive it explicitly: frames go in
//! through [`SimServer::receive`] and come out through [`SimServer::drain`].
//!
//! Behaviour on join: a system notice is broadcast to the sessions already
//! joined, then the joiner gets `CONNECTED` and the full history (notice
//! included), then everyone gets the new user list. Requested names that are
//! already taken are suffixed (`alice_2`, `alice_3`, ...).

use std::{
    collections::{BTreeMap, BTreeSet, VecDeque},
    sync::{Arc, Mutex},
};

use jabber_proto::{ClientFrame, MessageRecord, ProtocolError, SYSTEM_SENDER, ServerFrame};

use crate::SimEnv;

/// Server-side connection handle.
pub type ConnId = u64;

/// Server shared between several drivers.
pub type SharedSimServer = Arc<Mutex<SimServer>>;

/// Create a server wrapped for sharing.
pub fn create_shared_server(env: SimEnv) -> SharedSimServer {
    Arc::new(Mutex::new(SimServer::new(env)))
}

#[derive(Debug, Default)]
struct Session {
    identity: Option<String>,
    outbox: VecDeque<String>,
    /// Closed by the server; the client has not noticed yet.
    kicked: bool,
}

/// Simulation server.
#[derive(Debug)]
pub struct SimServer {
    env: SimEnv,
    sessions: BTreeMap<ConnId, Session>,
    /// Joined connections in join order.
    members: Vec<ConnId>,
    history: Vec<MessageRecord>,
    readers: BTreeMap<String, BTreeSet<String>>,
    next_conn: ConnId,
    next_message: u64,
}

impl SimServer {
    /// Create an empty server on `env`'s clock.
    pub fn new(env: SimEnv) -> Self {
        Self {
            env,
            sessions: BTreeMap::new(),
            members: Vec::new(),
            history: Vec::new(),
            readers: BTreeMap::new(),
            next_conn: 1,
            next_message: 1,
        }
    }

    /// Accept a new connection.
    pub fn open(&mut self) -> ConnId {
        let conn = self.next_conn;
        self.next_conn += 1;
        self.sessions.insert(conn, Session::default());
        tracing::debug!(conn, "connection opened");
        conn
    }

    /// True if `conn` exists and the server has not closed it.
    pub fn is_open(&self, conn: ConnId) -> bool {
        self.sessions.get(&conn).is_some_and(|session| !session.kicked)
    }

    /// Handle a text frame from `conn`.
    ///
    /// # Errors
    ///
    /// Returns the decode error for frames a server would reject. The
    /// connection stays open.
    pub fn receive(&mut self, conn: ConnId, text: &str) -> Result<(), ProtocolError> {
        if !self.is_open(conn) {
            tracing::debug!(conn, "frame on closed connection");
            return Ok(());
        }

        match ClientFrame::decode(text)? {
            ClientFrame::Connect { identity } => self.join(conn, &identity),
            ClientFrame::Disconnect { .. } => self.leave(conn),
            ClientFrame::Message { text } => self.post(conn, text),
            ClientFrame::Typing { active } => self.typing(conn, active),
            ClientFrame::Read { message_id } => self.read(conn, &message_id),
        }
        Ok(())
    }

    /// Client closed `conn`.
    pub fn close(&mut self, conn: ConnId) {
        self.leave(conn);
        self.sessions.remove(&conn);
        tracing::debug!(conn, "connection closed");
    }

    /// Server closes `conn`. Queued frames stay readable.
    pub fn kick(&mut self, conn: ConnId) {
        self.leave(conn);
        if let Some(session) = self.sessions.get_mut(&conn) {
            session.kicked = true;
        }
    }

    /// Queue raw text for `conn`, bypassing the protocol.
    pub fn inject(&mut self, conn: ConnId, text: impl Into<String>) {
        if let Some(session) = self.sessions.get_mut(&conn) {
            session.outbox.push_back(text.into());
        }
    }

    /// Take every frame queued for `conn`.
    pub fn drain(&mut self, conn: ConnId) -> Vec<String> {
        self.sessions
            .get_mut(&conn)
            .map(|session| session.outbox.drain(..).collect())
            .unwrap_or_default()
    }

    /// Frames queued across all connections.
    pub fn queued(&self) -> usize {
        self.sessions.values().map(|session| session.outbox.len()).sum()
    }

    /// Forget a kicked connection once its client has seen the close.
    pub fn reap(&mut self, conn: ConnId) {
        if self.sessions.get(&conn).is_some_and(|session| session.kicked) {
            self.sessions.remove(&conn);
        }
    }

    /// Online users in join order.
    pub fn users(&self) -> Vec<String> {
        self.members.iter().filter_map(|conn| self.identity(*conn).map(str::to_string)).collect()
    }

    /// Connection joined as `identity`, if any.
    pub fn conn_of(&self, identity: &str) -> Option<ConnId> {
        self.members.iter().copied().find(|conn| self.identity(*conn) == Some(identity))
    }

    /// Every message ever posted, in order.
    pub fn history(&self) -> &[MessageRecord] {
        &self.history
    }

    /// Current readers of `message_id`.
    pub fn readers(&self, message_id: &str) -> Vec<String> {
        self.readers.get(message_id).map(|set| set.iter().cloned().collect()).unwrap_or_default()
    }

    fn identity(&self, conn: ConnId) -> Option<&str> {
        self.sessions.get(&conn).and_then(|session| session.identity.as_deref())
    }

    fn join(&mut self, conn: ConnId, requested: &str) {
        if self.identity(conn).is_some() {
            tracing::warn!(conn, "CONNECT on joined session ignored");
            return;
        }

        let identity = self.unique_name(requested);
        if let Some(session) = self.sessions.get_mut(&conn) {
            session.identity = Some(identity.clone());
        }
        tracing::debug!(conn, %identity, "joined");

        self.system_notice(format!("{identity} joined the chat"));
        self.members.push(conn);
        self.send(conn, &ServerFrame::Connected { identity });
        self.send(conn, &ServerFrame::History { records: self.history.clone(), skipped: 0 });
        self.broadcast_users();
    }

    fn leave(&mut self, conn: ConnId) {
        let Some(identity) = self.sessions.get_mut(&conn).and_then(|s| s.identity.take()) else {
            return;
        };
        self.members.retain(|member| *member != conn);
        tracing::debug!(conn, %identity, "left");

        self.system_notice(format!("{identity} left the chat"));
        self.broadcast_users();
    }

    fn post(&mut self, conn: ConnId, text: String) {
        let Some(sender) = self.identity(conn).map(str::to_string) else {
            tracing::debug!(conn, "MESSAGE before CONNECT ignored");
            return;
        };
        let record = self.record(sender, text);
        self.broadcast(&ServerFrame::NewMessage(record));
    }

    fn typing(&mut self, conn: ConnId, active: bool) {
        let Some(identity) = self.identity(conn).map(str::to_string) else {
            return;
        };
        let frame = ServerFrame::Typing { identity, active };
        for member in self.members.clone() {
            if member != conn {
                self.send(member, &frame);
            }
        }
    }

    fn read(&mut self, conn: ConnId, message_id: &str) {
        let Some(reader) = self.identity(conn).map(str::to_string) else {
            return;
        };
        let Some(record) = self.history.iter().find(|record| record.id == message_id) else {
            tracing::debug!(conn, id = message_id, "READ for unknown message");
            return;
        };
        if record.sender == reader {
            return;
        }

        let readers = self.readers.entry(message_id.to_string()).or_default();
        if !readers.insert(reader) {
            return;
        }
        let frame = ServerFrame::ReadUpdate {
            message_id: message_id.to_string(),
            readers: readers.iter().cloned().collect(),
        };
        self.broadcast(&frame);
    }

    fn system_notice(&mut self, text: String) {
        let record = self.record(SYSTEM_SENDER.to_string(), text);
        self.broadcast(&ServerFrame::NewMessage(record));
    }

    fn record(&mut self, sender: String, text: String) -> MessageRecord {
        let id = format!("m{}", self.next_message);
        self.next_message += 1;
        let record = MessageRecord::new(id, sender, self.env.clock_time(), text);
        self.history.push(record.clone());
        record
    }

    fn unique_name(&self, requested: &str) -> String {
        let taken = |name: &str| self.conn_of(name).is_some() || name == SYSTEM_SENDER;
        if !taken(requested) {
            return requested.to_string();
        }
        (2u32..)
            .map(|n| format!("{requested}_{n}"))
            .find(|name| !taken(name))
            .unwrap_or_else(|| requested.to_string())
    }

    fn broadcast_users(&mut self) {
        self.broadcast(&ServerFrame::Users(self.users()));
    }

    fn broadcast(&mut self, frame: &ServerFrame) {
        for member in self.members.clone() {
            self.send(member, frame);
        }
    }

    fn send(&mut self, conn: ConnId, frame: &ServerFrame) {
        if let Some(session) = self.sessions.get_mut(&conn) {
            session.outbox.push_back(frame.encode());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server() -> SimServer {
        SimServer::new(SimEnv::new())
    }

    fn joined(server: &mut SimServer, name: &str) -> ConnId {
        let conn = server.open();
        server.receive(conn, &format!("CONNECT:{name}")).unwrap();
        conn
    }

    #[test]
    fn join_sequence() {
        let mut server = server();
        let conn = joined(&mut server, "alice");

        assert_eq!(server.drain(conn), vec![
            "CONNECTED:alice".to_string(),
            "MESSAGES:m1::System::00:00:00::alice joined the chat".to_string(),
            "USERS:alice".to_string(),
        ]);
    }

    #[test]
    fn members_hear_about_joiners() {
        let mut server = server();
        let alice = joined(&mut server, "alice");
        server.drain(alice);

        joined(&mut server, "bob");

        assert_eq!(server.drain(alice), vec![
            "NEW_MESSAGE:m2::System::00:00:00::bob joined the chat".to_string(),
            "USERS:alice,bob".to_string(),
        ]);
    }

    #[test]
    fn taken_names_are_suffixed() {
        let mut server = server();
        joined(&mut server, "alice");
        let second = joined(&mut server, "alice");
        let third = joined(&mut server, "alice");

        assert!(server.drain(second).contains(&"CONNECTED:alice_2".to_string()));
        assert!(server.drain(third).contains(&"CONNECTED:alice_3".to_string()));
        assert_eq!(server.users(), ["alice", "alice_2", "alice_3"]);
    }

    #[test]
    fn messages_reach_everyone_including_sender() {
        let mut server = server();
        let alice = joined(&mut server, "alice");
        let bob = joined(&mut server, "bob");
        server.drain(alice);
        server.drain(bob);

        server.receive(alice, "MESSAGE:hi").unwrap();

        let expected = vec!["NEW_MESSAGE:m3::alice::00:00:00::hi".to_string()];
        assert_eq!(server.drain(alice), expected);
        assert_eq!(server.drain(bob), expected);
    }

    #[test]
    fn typing_skips_the_typist() {
        let mut server = server();
        let alice = joined(&mut server, "alice");
        let bob = joined(&mut server, "bob");
        server.drain(alice);
        server.drain(bob);

        server.receive(alice, "TYPING:true").unwrap();

        assert!(server.drain(alice).is_empty());
        assert_eq!(server.drain(bob), vec!["TYPING:alice,true".to_string()]);
    }

    #[test]
    fn read_receipts_exclude_sender_and_repeats() {
        let mut server = server();
        let alice = joined(&mut server, "alice");
        let bob = joined(&mut server, "bob");
        server.receive(alice, "MESSAGE:hi").unwrap();
        server.drain(alice);
        server.drain(bob);

        server.receive(alice, "READ:m3").unwrap();
        assert!(server.drain(bob).is_empty());

        server.receive(bob, "READ:m3").unwrap();
        server.receive(bob, "READ:m3").unwrap();
        assert_eq!(server.drain(alice), vec!["READ_UPDATE:m3::bob".to_string()]);
        assert_eq!(server.readers("m3"), ["bob"]);
    }

    #[test]
    fn close_announces_departure() {
        let mut server = server();
        let alice = joined(&mut server, "alice");
        let bob = joined(&mut server, "bob");
        server.drain(bob);

        server.close(alice);

        let frames = server.drain(bob);
        assert!(frames[0].ends_with("::alice left the chat"));
        assert_eq!(frames[1], "USERS:bob");
        assert!(!server.is_open(alice));
    }

    #[test]
    fn kick_keeps_outbox_until_reaped() {
        let mut server = server();
        let alice = joined(&mut server, "alice");

        server.kick(alice);

        assert!(!server.is_open(alice));
        assert!(!server.drain(alice).is_empty());
        server.reap(alice);
        assert!(server.drain(alice).is_empty());
        assert!(server.users().is_empty());
    }

    #[test]
    fn bad_frames_are_rejected_without_closing() {
        let mut server = server();
        let alice = joined(&mut server, "alice");

        assert!(server.receive(alice, "USERS:alice").is_err());
        assert!(server.is_open(alice));
    }

    #[test]
    fn messages_before_connect_are_ignored() {
        let mut server = server();
        let conn = server.open();

        server.receive(conn, "MESSAGE:hi").unwrap();

        assert!(server.history().is_empty());
        assert!(server.drain(conn).is_empty());
    }
}
