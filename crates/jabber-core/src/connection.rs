//! Session lifecycle state machine.
//!
//! Owns the single live transport and drives the `CONNECT`/`CONNECTED`
//! handshake. Uses the action pattern: methods mutate state and return
//! actions for the driver to execute, so the machine performs no I/O and
//! tests need no sockets.
//!
//! # State Machine
//!
//! ```text
//!                connect(U)              CONNECTED:V
//! ┌──────────────┐ ───────> ┌────────────┐ ─────────> ┌───────────┐
//! │ Disconnected │          │ Connecting │            │ Connected │
//! └──────────────┘ <─────── └────────────┘            └───────────┘
//!        ^          closed /                                │
//!        │          disconnect                              │
//!        └──────────────────────────────────────────────────┘
//!                  disconnect (DISCONNECT:V) / closed
//! ```
//!
//! Every connect attempt allocates a fresh [`TransportId`]. Transport
//! callbacks carry the id they were issued for; once a transport has been
//! replaced or torn down its callbacks are rejected as stale, so a late close
//! from an old socket can never tear down a newer session.

use std::fmt;

use jabber_proto::ClientFrame;

use crate::error::ConnectionError;

/// Handle for one transport instance.
///
/// Ids are allocated monotonically per [`Connection`] and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransportId(u64);

impl TransportId {
    /// Wrap a raw transport number.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Raw transport number.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TransportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Actions returned by the connection state machine.
///
/// The driver executes these in order:
/// - `OpenTransport`: establish a new transport tagged with this id
/// - `Send`: encode the frame and write it to the current transport
/// - `CloseTransport`: close the transport with this id
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionAction {
    /// Open a transport and report back with this id
    OpenTransport(TransportId),

    /// Send this frame over the current transport
    Send(ClientFrame),

    /// Close this transport
    CloseTransport(TransportId),
}

/// Coarse session phase, without identity data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// No session
    Disconnected,
    /// Transport requested, waiting for `CONNECTED`
    Connecting,
    /// Handshake confirmed by the server
    Connected,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
        })
    }
}

/// Connection state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    /// No session and no transport
    Disconnected,
    /// Transport opening or open, `CONNECT` pending or sent
    Connecting {
        /// Identity submitted by the user
        requested: String,
    },
    /// Server confirmed the session
    Connected {
        /// Server-assigned identity, authoritative over the requested one
        identity: String,
    },
}

impl ConnectionState {
    /// Phase of this state.
    #[must_use]
    pub fn phase(&self) -> Phase {
        match self {
            Self::Disconnected => Phase::Disconnected,
            Self::Connecting { .. } => Phase::Connecting,
            Self::Connected { .. } => Phase::Connected,
        }
    }
}

/// Connection state machine.
///
/// Holds at most one live transport. Pure: no I/O, no clock.
#[derive(Debug, Clone)]
pub struct Connection {
    state: ConnectionState,
    /// Current transport, `None` while Disconnected
    transport: Option<TransportId>,
    /// Whether the current transport has signalled ready
    transport_open: bool,
    next_transport: u64,
}

impl Default for Connection {
    fn default() -> Self {
        Self::new()
    }
}

impl Connection {
    /// Create a connection in [`ConnectionState::Disconnected`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: ConnectionState::Disconnected,
            transport: None,
            transport_open: false,
            next_transport: 1,
        }
    }

    /// Current connection state.
    #[must_use]
    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    /// True once the server has confirmed the session.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        matches!(self.state, ConnectionState::Connected { .. })
    }

    /// Identity used for local comparisons.
    ///
    /// The requested identity while Connecting, the server-confirmed one once
    /// Connected, `None` while Disconnected.
    #[must_use]
    pub fn local_identity(&self) -> Option<&str> {
        match &self.state {
            ConnectionState::Disconnected => None,
            ConnectionState::Connecting { requested } => Some(requested),
            ConnectionState::Connected { identity } => Some(identity),
        }
    }

    /// Current transport, if any.
    #[must_use]
    pub fn transport(&self) -> Option<TransportId> {
        self.transport
    }

    /// Begin a session as `identity`.
    ///
    /// Allocates a fresh transport id and returns `OpenTransport`. `CONNECT`
    /// is only sent once the transport reports ready.
    ///
    /// # Errors
    ///
    /// - `ConnectionError::InvalidState` if not Disconnected
    /// - `ConnectionError::EmptyIdentity` if `identity` is blank
    pub fn connect(&mut self, identity: &str) -> Result<Vec<ConnectionAction>, ConnectionError> {
        if self.state != ConnectionState::Disconnected {
            return Err(self.invalid("connect"));
        }

        let identity = identity.trim();
        if identity.is_empty() {
            return Err(ConnectionError::EmptyIdentity);
        }

        let transport = TransportId::new(self.next_transport);
        self.next_transport += 1;

        self.state = ConnectionState::Connecting { requested: identity.to_string() };
        self.transport = Some(transport);
        self.transport_open = false;

        Ok(vec![ConnectionAction::OpenTransport(transport)])
    }

    /// Handle the transport signalling ready.
    ///
    /// Returns `Send(CONNECT:requested)`.
    ///
    /// # Errors
    ///
    /// - `ConnectionError::StaleTransport` if `transport` is not current
    /// - `ConnectionError::InvalidState` if the transport already opened
    pub fn transport_opened(
        &mut self,
        transport: TransportId,
    ) -> Result<Vec<ConnectionAction>, ConnectionError> {
        if self.transport != Some(transport) {
            return Err(ConnectionError::StaleTransport { transport });
        }

        match &self.state {
            ConnectionState::Connecting { requested } if !self.transport_open => {
                self.transport_open = true;
                Ok(vec![ConnectionAction::Send(ClientFrame::Connect {
                    identity: requested.clone(),
                })])
            },
            _ => Err(self.invalid("open transport")),
        }
    }

    /// Check that a frame from `transport` should be processed.
    ///
    /// Frames are accepted from the current transport once it has opened.
    ///
    /// # Errors
    ///
    /// - `ConnectionError::StaleTransport` otherwise
    pub fn accept_frame(&self, transport: TransportId) -> Result<(), ConnectionError> {
        if self.transport == Some(transport) && self.transport_open {
            Ok(())
        } else {
            Err(ConnectionError::StaleTransport { transport })
        }
    }

    /// Handle a `CONNECTED` confirmation.
    ///
    /// Records the server-assigned identity, which may differ from the
    /// requested one.
    ///
    /// # Errors
    ///
    /// - `ConnectionError::UnexpectedConfirmation` if not Connecting
    pub fn handle_connected(&mut self, identity: &str) -> Result<(), ConnectionError> {
        match self.state {
            ConnectionState::Connecting { .. } => {
                self.state = ConnectionState::Connected { identity: identity.to_string() };
                Ok(())
            },
            ConnectionState::Disconnected | ConnectionState::Connected { .. } => {
                Err(ConnectionError::UnexpectedConfirmation { phase: self.phase() })
            },
        }
    }

    /// End the session at the user's request.
    ///
    /// Connected sessions announce `DISCONNECT:identity` before the transport
    /// closes. A session that never completed the handshake just closes.
    ///
    /// # Errors
    ///
    /// - `ConnectionError::InvalidState` if already Disconnected
    pub fn disconnect(&mut self) -> Result<Vec<ConnectionAction>, ConnectionError> {
        let Some(transport) = self.transport else {
            return Err(self.invalid("disconnect"));
        };

        let mut actions = Vec::with_capacity(2);
        if let ConnectionState::Connected { identity } = &self.state {
            actions.push(ConnectionAction::Send(ClientFrame::Disconnect {
                identity: identity.clone(),
            }));
        }
        actions.push(ConnectionAction::CloseTransport(transport));

        self.reset();
        Ok(actions)
    }

    /// Handle the transport reporting closed or failed.
    ///
    /// Returns the phase the session was in before teardown.
    ///
    /// # Errors
    ///
    /// - `ConnectionError::StaleTransport` if `transport` is not current
    pub fn transport_closed(&mut self, transport: TransportId) -> Result<Phase, ConnectionError> {
        if self.transport != Some(transport) {
            return Err(ConnectionError::StaleTransport { transport });
        }

        let previous = self.phase();
        self.reset();
        Ok(previous)
    }

    fn reset(&mut self) {
        self.state = ConnectionState::Disconnected;
        self.transport = None;
        self.transport_open = false;
    }

    fn invalid(&self, operation: &'static str) -> ConnectionError {
        ConnectionError::InvalidState { phase: self.phase(), operation }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open(identity: &str) -> (Connection, TransportId) {
        let mut conn = Connection::new();
        let actions = conn.connect(identity).unwrap();
        let [ConnectionAction::OpenTransport(transport)] = actions[..] else {
            panic!("expected OpenTransport, got {actions:?}");
        };
        conn.transport_opened(transport).unwrap();
        (conn, transport)
    }

    #[test]
    fn connect_opens_transport_before_handshake() {
        let mut conn = Connection::new();

        let actions = conn.connect("alice").unwrap();

        assert_eq!(actions, vec![ConnectionAction::OpenTransport(TransportId::new(1))]);
        assert_eq!(conn.phase(), Phase::Connecting);
        assert_eq!(conn.local_identity(), Some("alice"));
    }

    #[test]
    fn connect_frame_waits_for_transport() {
        let mut conn = Connection::new();
        conn.connect("alice").unwrap();

        let actions = conn.transport_opened(TransportId::new(1)).unwrap();

        assert_eq!(
            actions,
            vec![ConnectionAction::Send(ClientFrame::Connect { identity: "alice".into() })]
        );
    }

    #[test]
    fn server_identity_is_authoritative() {
        let (mut conn, _) = open("alice");

        conn.handle_connected("alice_2").unwrap();

        assert!(conn.is_connected());
        assert_eq!(conn.local_identity(), Some("alice_2"));
    }

    #[test]
    fn connect_rejected_while_active() {
        let (mut conn, _) = open("alice");

        let err = conn.connect("bob").unwrap_err();

        assert_eq!(err, ConnectionError::InvalidState { phase: Phase::Connecting, operation: "connect" });
        assert_eq!(conn.transport(), Some(TransportId::new(1)));
    }

    #[test]
    fn blank_identity_rejected() {
        let mut conn = Connection::new();

        assert_eq!(conn.connect("   "), Err(ConnectionError::EmptyIdentity));
        assert_eq!(conn.phase(), Phase::Disconnected);
    }

    #[test]
    fn identity_is_trimmed() {
        let mut conn = Connection::new();
        conn.connect("  alice ").unwrap();

        assert_eq!(conn.local_identity(), Some("alice"));
    }

    #[test]
    fn disconnect_when_connected_announces_leave() {
        let (mut conn, transport) = open("alice");
        conn.handle_connected("alice").unwrap();

        let actions = conn.disconnect().unwrap();

        assert_eq!(
            actions,
            vec![
                ConnectionAction::Send(ClientFrame::Disconnect { identity: "alice".into() }),
                ConnectionAction::CloseTransport(transport),
            ]
        );
        assert_eq!(conn.state(), &ConnectionState::Disconnected);
        assert_eq!(conn.local_identity(), None);
    }

    #[test]
    fn disconnect_while_connecting_only_closes() {
        let (mut conn, transport) = open("alice");

        let actions = conn.disconnect().unwrap();

        assert_eq!(actions, vec![ConnectionAction::CloseTransport(transport)]);
    }

    #[test]
    fn disconnect_when_idle_is_invalid() {
        let mut conn = Connection::new();

        assert!(matches!(conn.disconnect(), Err(ConnectionError::InvalidState { .. })));
    }

    #[test]
    fn transport_close_tears_down() {
        let (mut conn, transport) = open("alice");
        conn.handle_connected("alice").unwrap();

        let previous = conn.transport_closed(transport).unwrap();

        assert_eq!(previous, Phase::Connected);
        assert_eq!(conn.phase(), Phase::Disconnected);
        assert_eq!(conn.transport(), None);
    }

    #[test]
    fn stale_close_cannot_touch_new_session() {
        let (mut conn, old) = open("alice");
        conn.disconnect().unwrap();
        conn.connect("bob").unwrap();
        let new = conn.transport().unwrap();
        conn.transport_opened(new).unwrap();

        assert_eq!(
            conn.transport_closed(old),
            Err(ConnectionError::StaleTransport { transport: old })
        );
        assert_eq!(conn.transport(), Some(new));
        assert_eq!(conn.local_identity(), Some("bob"));
    }

    #[test]
    fn transport_ids_are_never_reused() {
        let mut conn = Connection::new();
        let mut seen = Vec::new();

        for _ in 0..3 {
            conn.connect("alice").unwrap();
            seen.push(conn.transport().unwrap());
            conn.disconnect().unwrap();
        }

        assert_eq!(seen, vec![TransportId::new(1), TransportId::new(2), TransportId::new(3)]);
    }

    #[test]
    fn frames_require_open_current_transport() {
        let mut conn = Connection::new();
        conn.connect("alice").unwrap();
        let transport = conn.transport().unwrap();

        assert!(conn.accept_frame(transport).is_err());

        conn.transport_opened(transport).unwrap();

        assert!(conn.accept_frame(transport).is_ok());
        assert!(conn.accept_frame(TransportId::new(99)).is_err());
    }

    #[test]
    fn duplicate_confirmation_is_rejected() {
        let (mut conn, _) = open("alice");
        conn.handle_connected("alice").unwrap();

        assert_eq!(
            conn.handle_connected("mallory"),
            Err(ConnectionError::UnexpectedConfirmation { phase: Phase::Connected })
        );
        assert_eq!(conn.local_identity(), Some("alice"));
    }

    #[test]
    fn duplicate_open_is_rejected() {
        let (mut conn, transport) = open("alice");

        assert!(matches!(
            conn.transport_opened(transport),
            Err(ConnectionError::InvalidState { .. })
        ));
    }
}
