//! Simulation driver implementing the Driver trait.
//!
//! `SimDriver` provides the same interface as `TerminalDriver` but for
//! deterministic testing. It implements [`Driver`] so the same
//! [`jabber_app::Runtime`] orchestration code runs in both production and
//! simulation.

use std::{
    collections::{BTreeMap, VecDeque},
    sync::{MutexGuard, PoisonError},
};

use jabber_app::{App, AppEvent, Driver, KeyInput, TransportEvent};
use jabber_core::{Environment, TransportId};
use thiserror::Error;

use crate::{
    SimEnv, SimInstant,
    invariants::{ClientSnapshot, InvariantRegistry, SystemSnapshot},
    sim_server::{ConnId, SharedSimServer, SimServer},
};

/// Error type for simulation driver.
#[derive(Debug, Clone, Error)]
#[error("SimDriverError: {0}")]
pub struct SimDriverError(pub String);

/// Simulation driver for deterministic testing.
///
/// Implements [`Driver`] trait so the same [`jabber_app::Runtime`]
/// orchestration code runs in both production TUI and simulation tests.
#[derive(Debug)]
pub struct SimDriver {
    id: u64,
    env: SimEnv,
    server: SharedSimServer,
    pending_events: VecDeque<AppEvent>,
    transports: BTreeMap<TransportId, ConnId>,
    incoming: VecDeque<TransportEvent>,
    refuse_connections: bool,
    viewport: Option<usize>,
    renders: usize,
    invariants: Option<InvariantRegistry>,
}

impl SimDriver {
    /// Create a driver for client `id` talking to `server`.
    pub fn new(id: u64, env: SimEnv, server: SharedSimServer) -> Self {
        Self {
            id,
            env,
            server,
            pending_events: VecDeque::new(),
            transports: BTreeMap::new(),
            incoming: VecDeque::new(),
            refuse_connections: false,
            viewport: None,
            renders: 0,
            invariants: None,
        }
    }

    /// Enable invariant checking on every render.
    #[must_use]
    pub fn with_invariants(mut self, registry: InvariantRegistry) -> Self {
        self.invariants = Some(registry);
        self
    }

    /// Only the last `rows` messages count as visible. Default: all.
    #[must_use]
    pub fn with_viewport(mut self, rows: usize) -> Self {
        self.viewport = Some(rows);
        self
    }

    /// Inject an `AppEvent` for processing.
    pub fn inject_event(&mut self, event: AppEvent) {
        self.pending_events.push_back(event);
    }

    /// Inject keystrokes for `line` followed by Enter.
    pub fn type_line(&mut self, line: &str) {
        for c in line.chars() {
            self.inject_event(AppEvent::Key(KeyInput::Char(c)));
        }
        self.inject_event(AppEvent::Key(KeyInput::Enter));
    }

    /// Fail every following connection attempt.
    pub fn refuse_connections(&mut self, refuse: bool) {
        self.refuse_connections = refuse;
    }

    /// Check if there are pending events to process.
    pub fn has_pending(&self) -> bool {
        !self.pending_events.is_empty() || !self.incoming.is_empty()
    }

    /// Server connection behind `transport`, if open.
    pub fn conn(&self, transport: TransportId) -> Option<ConnId> {
        self.transports.get(&transport).copied()
    }

    /// Number of renders so far.
    pub fn renders(&self) -> usize {
        self.renders
    }

    /// Check invariants against App state.
    pub fn check_invariants(&self, app: &App, context: &str) {
        if let Some(ref registry) = self.invariants {
            let snapshot = SystemSnapshot::single(ClientSnapshot::from_app(self.id, app));
            registry.assert_all(&snapshot, context);
        }
    }

    fn server(&self) -> MutexGuard<'_, SimServer> {
        self.server.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Move everything the server queued into `incoming`.
    fn pull_from_server(&mut self) {
        let mut closed = Vec::new();
        {
            let mut server = self.server.lock().unwrap_or_else(PoisonError::into_inner);
            for (&transport, &conn) in &self.transports {
                for text in server.drain(conn) {
                    self.incoming.push_back(TransportEvent::Frame { transport, text });
                }
                if !server.is_open(conn) {
                    server.reap(conn);
                    closed.push(transport);
                }
            }
        }

        for transport in closed {
            self.transports.remove(&transport);
            self.incoming
                .push_back(TransportEvent::Closed { transport, reason: "closed by server".into() });
        }
    }
}

impl Driver for SimDriver {
    type Error = SimDriverError;
    type Instant = SimInstant;

    async fn poll_event(&mut self) -> Result<Option<AppEvent>, Self::Error> {
        Ok(self.pending_events.pop_front())
    }

    async fn open(&mut self, transport: TransportId) {
        if self.refuse_connections {
            self.incoming.push_back(TransportEvent::Closed {
                transport,
                reason: "connection refused".into(),
            });
            return;
        }

        let conn = self.server().open();
        self.transports.insert(transport, conn);
        self.incoming.push_back(TransportEvent::Opened { transport });
    }

    async fn send_text(&mut self, transport: TransportId, text: String) {
        let Some(conn) = self.conn(transport) else {
            tracing::debug!(%transport, "send on unknown transport dropped");
            return;
        };
        if let Err(e) = self.server().receive(conn, &text) {
            tracing::warn!(%transport, error = %e, "server rejected frame");
        }
    }

    async fn recv(&mut self) -> Option<TransportEvent> {
        if self.incoming.is_empty() {
            self.pull_from_server();
        }
        self.incoming.pop_front()
    }

    fn close(&mut self, transport: TransportId) {
        if let Some(conn) = self.transports.remove(&transport) {
            self.server().close(conn);
        }
        self.incoming.retain(|event| match event {
            TransportEvent::Opened { transport: t }
            | TransportEvent::Frame { transport: t, .. }
            | TransportEvent::Closed { transport: t, .. } => *t != transport,
        });
    }

    fn now(&self) -> Self::Instant {
        self.env.now()
    }

    fn render(&mut self, app: &App) -> Result<Vec<String>, Self::Error> {
        self.renders += 1;
        self.check_invariants(app, &format!("at render {}", self.renders));

        let messages = &app.snapshot().messages;
        let first = self.viewport.map_or(0, |rows| messages.len().saturating_sub(rows));
        Ok(messages[first..].iter().map(|message| message.id.clone()).collect())
    }

    fn stop(&mut self) {
        let transports: Vec<TransportId> = self.transports.keys().copied().collect();
        for transport in transports {
            self.close(transport);
        }
    }
}
