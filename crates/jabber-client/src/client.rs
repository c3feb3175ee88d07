//! Client state machine.
//!
//! The `Client` owns the session lifecycle and every piece of derived chat
//! state. Inbound frames are decoded and routed to the component that owns
//! them; user intents are turned into frames for the current transport.

use std::{ops::Sub, time::Duration};

use jabber_core::{Connection, ConnectionAction, ConnectionError, Phase, TransportId};
use jabber_proto::{ClientFrame, ServerFrame};

use crate::{
    config::ClientConfig,
    error::ClientError,
    event::{Change, ClientAction, ClientEvent},
    message_store::MessageStore,
    presence::Presence,
    receipts::ReadReceipts,
    snapshot::ChatSnapshot,
    typing::{TypingDebounce, TypingIndicator},
};

/// Chat client engine.
///
/// Pure state machine: no I/O, no clock. Generic over `I` (Instant type) so
/// tests can drive the typing debounce with virtual time.
#[derive(Debug, Clone)]
pub struct Client<I = std::time::Instant> {
    connection: Connection,
    messages: MessageStore,
    receipts: ReadReceipts,
    presence: Presence,
    typing: TypingIndicator,
    debounce: TypingDebounce<I>,
}

impl<I> Client<I>
where
    I: Copy + Ord + Sub<Output = Duration>,
{
    /// Create a disconnected client.
    pub fn new(config: ClientConfig) -> Self {
        Self {
            connection: Connection::new(),
            messages: MessageStore::new(),
            receipts: ReadReceipts::new(),
            presence: Presence::new(),
            typing: TypingIndicator::new(),
            debounce: TypingDebounce::new(config.typing_debounce),
        }
    }

    /// Current session phase.
    pub fn phase(&self) -> Phase {
        self.connection.phase()
    }

    /// Identity used for local comparisons, `None` while Disconnected.
    pub fn local_identity(&self) -> Option<&str> {
        self.connection.local_identity()
    }

    /// Current transport, if any.
    pub fn transport(&self) -> Option<TransportId> {
        self.connection.transport()
    }

    /// Message log.
    pub fn messages(&self) -> &MessageStore {
        &self.messages
    }

    /// Receipts sent this session.
    pub fn receipts(&self) -> &ReadReceipts {
        &self.receipts
    }

    /// Online users.
    pub fn presence(&self) -> &Presence {
        &self.presence
    }

    /// Remote typing peers.
    pub fn typing(&self) -> &TypingIndicator {
        &self.typing
    }

    /// True while the local typing debounce is pending.
    pub fn is_typing(&self) -> bool {
        self.debounce.is_armed()
    }

    /// Owned copy of the observable state.
    pub fn snapshot(&self) -> ChatSnapshot {
        ChatSnapshot {
            phase: self.phase(),
            local_identity: self.local_identity().map(str::to_string),
            messages: self.messages.messages().to_vec(),
            presence: self.presence.users().to_vec(),
            typing: self.typing.peers().to_vec(),
        }
    }

    /// Process an event and return actions for the caller.
    ///
    /// # Errors
    ///
    /// - `ClientError::NotConnected` when sending a message without a session
    /// - `ClientError::Connection` for lifecycle requests made in the wrong
    ///   phase (disconnect while idle, blank identity)
    pub fn handle(&mut self, event: ClientEvent<I>) -> Result<Vec<ClientAction>, ClientError> {
        match event {
            ClientEvent::Connect { identity } => self.handle_connect(&identity),
            ClientEvent::Disconnect => self.handle_disconnect(),
            ClientEvent::TransportOpened { transport } => self.handle_opened(transport),
            ClientEvent::FrameReceived { transport, text } => {
                Ok(self.handle_frame(transport, &text))
            },
            ClientEvent::TransportClosed { transport, reason } => {
                Ok(self.handle_closed(transport, &reason))
            },
            ClientEvent::InputChanged { now } => Ok(self.handle_input(now)),
            ClientEvent::SendMessage { text } => self.handle_send_message(text),
            ClientEvent::MessageVisible { message_id } => Ok(self.handle_visible(&message_id)),
            ClientEvent::Tick { now } => Ok(self.handle_tick(now)),
        }
    }

    fn handle_connect(&mut self, identity: &str) -> Result<Vec<ClientAction>, ClientError> {
        if identity.trim().is_empty() {
            return Err(ConnectionError::EmptyIdentity.into());
        }

        let mut actions = Vec::new();
        if self.phase() != Phase::Disconnected {
            tracing::info!(phase = %self.phase(), "tearing down session before reconnect");
            actions.extend(self.handle_disconnect()?);
        }

        let opened = self.connection.connect(identity)?;
        actions.extend(lift(opened, None));
        actions.push(ClientAction::Notify(Change::Session));

        tracing::info!(identity = identity.trim(), "connecting");
        Ok(actions)
    }

    fn handle_disconnect(&mut self) -> Result<Vec<ClientAction>, ClientError> {
        let transport = self.connection.transport();
        let was_connected = self.connection.is_connected();

        let lifecycle = self.connection.disconnect()?;

        let mut actions = Vec::with_capacity(lifecycle.len() + 5);
        self.debounce.cancel();
        if let (true, Some(transport)) = (was_connected, transport) {
            actions.push(ClientAction::Send {
                transport,
                frame: ClientFrame::Typing { active: false },
            });
        }
        actions.extend(lift(lifecycle, transport));
        actions.extend(self.clear_session());

        tracing::info!("disconnected by user");
        Ok(actions)
    }

    fn handle_opened(&mut self, transport: TransportId) -> Result<Vec<ClientAction>, ClientError> {
        match self.connection.transport_opened(transport) {
            Ok(lifecycle) => {
                tracing::debug!(%transport, "transport open, sending handshake");
                Ok(lift(lifecycle, Some(transport)))
            },
            Err(err) if err.is_benign() => {
                tracing::warn!(%err, "ignoring transport open");
                Ok(Vec::new())
            },
            Err(err) => Err(err.into()),
        }
    }

    fn handle_frame(&mut self, transport: TransportId, text: &str) -> Vec<ClientAction> {
        if let Err(err) = self.connection.accept_frame(transport) {
            tracing::warn!(%err, "dropping frame");
            return Vec::new();
        }

        match ServerFrame::decode(text) {
            Ok(frame) => self.route(frame),
            Err(err) => {
                tracing::warn!(%err, frame = text, "dropping malformed frame");
                Vec::new()
            },
        }
    }

    fn route(&mut self, frame: ServerFrame) -> Vec<ClientAction> {
        match frame {
            ServerFrame::Connected { identity } => self.handle_confirmed(&identity),
            ServerFrame::NewMessage(record) => {
                let id = record.id.clone();
                if self.messages.apply_new_message(record) {
                    vec![ClientAction::Notify(Change::Messages)]
                } else {
                    tracing::debug!(%id, "duplicate message");
                    Vec::new()
                }
            },
            ServerFrame::ReadUpdate { message_id, readers } => {
                if self.messages.apply_read_update(&message_id, readers) {
                    vec![ClientAction::Notify(Change::Messages)]
                } else {
                    tracing::debug!(id = %message_id, "read update for unknown message");
                    Vec::new()
                }
            },
            ServerFrame::Users(users) => {
                if self.presence.replace(users) {
                    vec![ClientAction::Notify(Change::Presence)]
                } else {
                    Vec::new()
                }
            },
            ServerFrame::Typing { identity, active } => {
                if self.local_identity() == Some(identity.as_str()) {
                    return Vec::new();
                }
                if self.typing.set(&identity, active) {
                    vec![ClientAction::Notify(Change::Typing)]
                } else {
                    Vec::new()
                }
            },
            ServerFrame::History { records, skipped } => {
                if skipped > 0 {
                    tracing::warn!(skipped, "history contained malformed records");
                }
                let mut appended = 0usize;
                for record in records {
                    appended += usize::from(self.messages.apply_new_message(record));
                }
                tracing::debug!(appended, "history replayed");
                if appended > 0 { vec![ClientAction::Notify(Change::Messages)] } else { Vec::new() }
            },
        }
    }

    fn handle_confirmed(&mut self, identity: &str) -> Vec<ClientAction> {
        if let Err(err) = self.connection.handle_connected(identity) {
            tracing::debug!(%err, identity, "ignoring confirmation");
            return Vec::new();
        }

        tracing::info!(identity, "connected");

        let mut actions = vec![ClientAction::Notify(Change::Session)];
        if self.typing.remove(identity) {
            actions.push(ClientAction::Notify(Change::Typing));
        }
        actions
    }

    fn handle_closed(&mut self, transport: TransportId, reason: &str) -> Vec<ClientAction> {
        match self.connection.transport_closed(transport) {
            Ok(previous) => {
                tracing::info!(%transport, %previous, reason, "connection lost");
                self.debounce.cancel();
                self.clear_session()
            },
            Err(err) => {
                tracing::warn!(%err, reason, "ignoring transport close");
                Vec::new()
            },
        }
    }

    fn handle_input(&mut self, now: I) -> Vec<ClientAction> {
        let Some(transport) = self.connected_transport() else {
            return Vec::new();
        };

        self.debounce.arm(now);
        vec![ClientAction::Send { transport, frame: ClientFrame::Typing { active: true } }]
    }

    fn handle_send_message(&mut self, text: String) -> Result<Vec<ClientAction>, ClientError> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        let transport = self.connected_transport().ok_or(ClientError::NotConnected)?;

        self.debounce.cancel();
        Ok(vec![
            ClientAction::Send { transport, frame: ClientFrame::Message { text } },
            ClientAction::Send { transport, frame: ClientFrame::Typing { active: false } },
        ])
    }

    fn handle_visible(&mut self, message_id: &str) -> Vec<ClientAction> {
        let Some(transport) = self.connected_transport() else {
            tracing::debug!(id = message_id, "visibility without session");
            return Vec::new();
        };
        let Some(local) = self.connection.local_identity() else {
            return Vec::new();
        };
        let Some(message) = self.messages.get(message_id) else {
            tracing::debug!(id = message_id, "visibility for unknown message");
            return Vec::new();
        };

        self.receipts
            .on_visible(message, local)
            .map(|frame| ClientAction::Send { transport, frame })
            .into_iter()
            .collect()
    }

    fn handle_tick(&mut self, now: I) -> Vec<ClientAction> {
        if !self.debounce.poll(now) {
            return Vec::new();
        }

        match self.connected_transport() {
            Some(transport) => {
                vec![ClientAction::Send { transport, frame: ClientFrame::Typing { active: false } }]
            },
            None => Vec::new(),
        }
    }

    /// Transport of a confirmed session.
    fn connected_transport(&self) -> Option<TransportId> {
        if self.connection.is_connected() { self.connection.transport() } else { None }
    }

    /// Drop every session-scoped piece of state.
    fn clear_session(&mut self) -> Vec<ClientAction> {
        self.messages.clear();
        self.presence.clear();
        self.typing.clear();
        self.receipts.clear();

        vec![
            ClientAction::Notify(Change::Session),
            ClientAction::Notify(Change::Messages),
            ClientAction::Notify(Change::Presence),
            ClientAction::Notify(Change::Typing),
        ]
    }
}

/// Convert lifecycle actions into client actions.
///
/// `Send` targets `transport`, which must be the transport current before the
/// lifecycle call; a `Send` without one is dropped.
fn lift(actions: Vec<ConnectionAction>, transport: Option<TransportId>) -> Vec<ClientAction> {
    actions
        .into_iter()
        .filter_map(|action| match action {
            ConnectionAction::OpenTransport(id) => Some(ClientAction::OpenTransport(id)),
            ConnectionAction::CloseTransport(id) => Some(ClientAction::CloseTransport(id)),
            ConnectionAction::Send(frame) => {
                transport.map(|transport| ClientAction::Send { transport, frame })
            },
        })
        .collect()
}
