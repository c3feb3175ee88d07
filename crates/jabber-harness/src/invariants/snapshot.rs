//! Observable state snapshots for invariant checking.
//!
//! Snapshots capture the observable state of the system at a point in time.
//! Invariants operate on snapshots rather than live state to ensure
//! consistent, atomic checks.

use jabber_app::App;
use jabber_client::ChatSnapshot;

/// Snapshot of the entire system state.
///
/// Contains observable state from one or more clients for invariant checking.
#[derive(Debug, Clone, Default)]
pub struct SystemSnapshot {
    /// Per-client state snapshots.
    pub clients: Vec<ClientSnapshot>,
}

impl SystemSnapshot {
    /// Create an empty snapshot (no clients).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a snapshot with a single client.
    pub fn single(client: ClientSnapshot) -> Self {
        Self { clients: vec![client] }
    }

    /// Create a snapshot from multiple clients.
    pub fn from_clients(clients: Vec<ClientSnapshot>) -> Self {
        Self { clients }
    }

    /// Add a client snapshot.
    pub fn add_client(&mut self, client: ClientSnapshot) {
        self.clients.push(client);
    }
}

/// Snapshot of a single client's observable state.
#[derive(Debug, Clone)]
pub struct ClientSnapshot {
    /// Client identifier within the simulation.
    pub id: u64,
    /// Chat state as the client last published it.
    pub chat: ChatSnapshot,
}

impl ClientSnapshot {
    /// Create a new client snapshot.
    pub fn new(id: u64, chat: ChatSnapshot) -> Self {
        Self { id, chat }
    }

    /// Capture the chat state an App is rendering.
    pub fn from_app(id: u64, app: &App) -> Self {
        Self::new(id, app.snapshot().clone())
    }
}
