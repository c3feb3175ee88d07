//! Protocol-to-Application translation layer.
//!
//! The [`Bridge`] wraps the low-level [`jabber_client::Client`] and adapts
//! it to the high-level application lifecycle.
//!
//! # Responsibilities
//!
//! - Converts high-level [`crate::AppAction`] and [`crate::TransportEvent`]
//!   into client events.
//! - Accumulates outgoing [`TransportCommand`]s to be executed by the driver
//!   in the next I/O cycle.
//! - Publishes a fresh [`ChatSnapshot`] whenever the client reports a change,
//!   both as an [`AppEvent`] and on a watch channel for other observers.
//! - Manages time ticks generically to support both real-time execution and
//!   deterministic simulation.

use jabber_client::{ChatSnapshot, Client, ClientAction, ClientConfig, ClientError, ClientEvent};
use jabber_core::{Environment, TransportId};
use tokio::sync::watch;

use crate::{AppAction, AppEvent, TransportEvent};

/// Transport work queued for the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCommand {
    /// Open a new transport.
    Open(TransportId),
    /// Send a text frame.
    Send {
        /// Target transport.
        transport: TransportId,
        /// Encoded frame.
        text: String,
    },
    /// Close a transport.
    Close(TransportId),
}

/// Bridge between App and Client protocol logic.
///
/// Generic over Environment to support both production and simulation.
/// The Instant type is determined by the Environment's associated type.
pub struct Bridge<E: Environment> {
    client: Client<E::Instant>,
    outgoing: Vec<TransportCommand>,
    snapshots: watch::Sender<ChatSnapshot>,
}

impl<E: Environment> Bridge<E> {
    /// Create a new Bridge with a disconnected client.
    pub fn new(config: ClientConfig) -> Self {
        let (snapshots, _) = watch::channel(ChatSnapshot::default());
        Self { client: Client::new(config), outgoing: Vec::new(), snapshots }
    }

    /// Observe published snapshots.
    ///
    /// Receivers see the latest snapshot only; intermediate ones may be
    /// skipped.
    pub fn subscribe(&self) -> watch::Receiver<ChatSnapshot> {
        self.snapshots.subscribe()
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> ChatSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Underlying client, read-only.
    pub fn client(&self) -> &Client<E::Instant> {
        &self.client
    }

    /// Process an App action and return resulting App events.
    pub fn process_app_action(&mut self, action: AppAction, now: E::Instant) -> Vec<AppEvent> {
        match action {
            AppAction::Connect { identity } => {
                tracing::info!(%identity, "connecting");
                let result = self.client.handle(ClientEvent::Connect { identity });
                self.handle_client_result(result)
            },
            AppAction::Disconnect => {
                tracing::info!("disconnecting");
                let result = self.client.handle(ClientEvent::Disconnect);
                self.handle_client_result(result)
            },
            AppAction::SendMessage { text } => {
                let result = self.client.handle(ClientEvent::SendMessage { text });
                self.handle_client_result(result)
            },
            AppAction::InputChanged => {
                let result = self.client.handle(ClientEvent::InputChanged { now });
                self.handle_client_result(result)
            },
            AppAction::MessagesVisible { ids } => {
                let mut events = Vec::new();
                for message_id in ids {
                    let result = self.client.handle(ClientEvent::MessageVisible { message_id });
                    events.extend(self.handle_client_result(result));
                }
                events
            },
            AppAction::Render | AppAction::Quit => vec![],
        }
    }

    /// Handle something a transport reported.
    pub fn handle_transport(&mut self, event: TransportEvent) -> Vec<AppEvent> {
        let event = match event {
            TransportEvent::Opened { transport } => ClientEvent::TransportOpened { transport },
            TransportEvent::Frame { transport, text } => {
                ClientEvent::FrameReceived { transport, text }
            },
            TransportEvent::Closed { transport, reason } => {
                ClientEvent::TransportClosed { transport, reason }
            },
        };
        let result = self.client.handle(event);
        self.handle_client_result(result)
    }

    /// Process a time tick.
    pub fn handle_tick(&mut self, now: E::Instant) -> Vec<AppEvent> {
        let result = self.client.handle(ClientEvent::Tick { now });
        self.handle_client_result(result)
    }

    /// Take pending transport commands.
    pub fn take_outgoing(&mut self) -> Vec<TransportCommand> {
        std::mem::take(&mut self.outgoing)
    }

    fn handle_client_result(
        &mut self,
        result: Result<Vec<ClientAction>, ClientError>,
    ) -> Vec<AppEvent> {
        match result {
            Ok(actions) => self.process_client_actions(actions),
            Err(e) => vec![AppEvent::Error { message: e.to_string() }],
        }
    }

    fn process_client_actions(&mut self, actions: Vec<ClientAction>) -> Vec<AppEvent> {
        let mut changed = false;

        for action in actions {
            match action {
                ClientAction::OpenTransport(transport) => {
                    self.outgoing.push(TransportCommand::Open(transport));
                },
                ClientAction::Send { transport, frame } => {
                    self.outgoing.push(TransportCommand::Send { transport, text: frame.encode() });
                },
                ClientAction::CloseTransport(transport) => {
                    self.outgoing.push(TransportCommand::Close(transport));
                },
                ClientAction::Notify(change) => {
                    tracing::trace!(?change, "client state changed");
                    changed = true;
                },
            }
        }

        if !changed {
            return vec![];
        }

        let snapshot = self.client.snapshot();
        self.snapshots.send_replace(snapshot.clone());
        vec![AppEvent::Snapshot(snapshot)]
    }
}
