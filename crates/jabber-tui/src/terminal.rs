//! Terminal driver for the TUI.
//!
//! Implements the [`Driver`] trait for terminal I/O using crossterm for
//! keyboard events and ratatui for rendering. Each transport id the client
//! opens gets its own WebSocket link, run as a tokio task that reports back
//! over a shared channel.

use std::{
    collections::{BTreeMap, VecDeque},
    io::{self, Stdout, stdout},
    time::{Duration, Instant},
};

use crossterm::{
    ExecutableCommand,
    event::{Event, EventStream},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use jabber_app::{App, AppEvent, Driver, TransportEvent};
use jabber_client::transport::{self as websocket, Incoming};
use jabber_core::TransportId;
use ratatui::{Terminal, backend::CrosstermBackend};
use thiserror::Error;
use tokio::{
    sync::mpsc,
    task::AbortHandle,
    time::{Interval, MissedTickBehavior},
};

use crate::{keys, ui};

/// Interval between `Tick` events when the terminal is idle.
const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Terminal driver errors.
#[derive(Debug, Error)]
pub enum TerminalError {
    /// I/O error from terminal operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The terminal event stream ended.
    #[error("terminal event stream closed")]
    InputClosed,
}

/// One open WebSocket link.
struct Link {
    outgoing: mpsc::UnboundedSender<String>,
    task: AbortHandle,
}

/// Terminal driver implementing the [`Driver`] trait.
///
/// Handles terminal I/O (crossterm), rendering (ratatui), and one
/// WebSocket link per transport id (tokio-tungstenite).
pub struct TerminalDriver {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    event_stream: EventStream,
    tick: Interval,
    server_url: String,
    links: BTreeMap<TransportId, Link>,
    events_tx: mpsc::UnboundedSender<TransportEvent>,
    events_rx: mpsc::UnboundedReceiver<TransportEvent>,
    stashed: VecDeque<TransportEvent>,
}

impl TerminalDriver {
    /// Take over the terminal and prepare to connect to `server_url`.
    ///
    /// Must be called inside a tokio runtime.
    pub fn new(server_url: impl Into<String>) -> Result<Self, TerminalError> {
        enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout());
        let terminal = Terminal::new(backend)?;

        let mut tick = tokio::time::interval(TICK_INTERVAL);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let (events_tx, events_rx) = mpsc::unbounded_channel();

        Ok(Self {
            terminal,
            event_stream: EventStream::new(),
            tick,
            server_url: server_url.into(),
            links: BTreeMap::new(),
            events_tx,
            events_rx,
            stashed: VecDeque::new(),
        })
    }

    /// True if `event` belongs to a link that is still open.
    fn is_live(&self, event: &TransportEvent) -> bool {
        let transport = match event {
            TransportEvent::Opened { transport }
            | TransportEvent::Frame { transport, .. }
            | TransportEvent::Closed { transport, .. } => transport,
        };
        self.links.contains_key(transport)
    }
}

impl Driver for TerminalDriver {
    type Error = TerminalError;
    type Instant = Instant;

    async fn poll_event(&mut self) -> Result<Option<AppEvent>, Self::Error> {
        tokio::select! {
            biased;

            // Terminal events
            maybe_event = self.event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) => Ok(keys::convert(key).map(AppEvent::Key)),
                    Some(Ok(Event::Resize(cols, rows))) => Ok(Some(AppEvent::Resize(cols, rows))),
                    Some(Ok(_)) => Ok(None),
                    Some(Err(e)) => Err(TerminalError::Io(e)),
                    None => Err(TerminalError::InputClosed),
                }
            }

            // Network activity wakes the loop; the runtime drains it via recv
            Some(event) = self.events_rx.recv() => {
                self.stashed.push_back(event);
                Ok(None)
            }

            _ = self.tick.tick() => Ok(Some(AppEvent::Tick)),
        }
    }

    async fn open(&mut self, transport: TransportId) {
        let (outgoing, outgoing_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run_link(
            self.server_url.clone(),
            transport,
            outgoing_rx,
            self.events_tx.clone(),
        ));

        tracing::debug!(%transport, url = %self.server_url, "opening link");
        self.links.insert(transport, Link { outgoing, task: task.abort_handle() });
    }

    async fn send_text(&mut self, transport: TransportId, text: String) {
        let Some(link) = self.links.get(&transport) else {
            tracing::debug!(%transport, "send on unknown transport dropped");
            return;
        };
        // A dead task has already queued its Closed event.
        if link.outgoing.send(text).is_err() {
            tracing::debug!(%transport, "send on finished link dropped");
        }
    }

    async fn recv(&mut self) -> Option<TransportEvent> {
        loop {
            let event = match self.stashed.pop_front() {
                Some(event) => event,
                None => self.events_rx.try_recv().ok()?,
            };

            if !self.is_live(&event) {
                tracing::debug!(?event, "dropping event for closed link");
                continue;
            }
            if let TransportEvent::Closed { transport, reason } = &event {
                tracing::info!(%transport, %reason, "link closed");
                self.links.remove(transport);
            }
            return Some(event);
        }
    }

    fn close(&mut self, transport: TransportId) {
        // Dropping the sender lets the task flush and close the socket.
        if self.links.remove(&transport).is_some() {
            tracing::debug!(%transport, "closing link");
        }
    }

    fn now(&self) -> Self::Instant {
        Instant::now()
    }

    fn render(&mut self, app: &App) -> Result<Vec<String>, Self::Error> {
        let mut visible = Vec::new();
        self.terminal.draw(|frame| {
            visible = ui::render(frame, app);
        })?;
        Ok(visible)
    }

    fn stop(&mut self) {
        for (transport, link) in std::mem::take(&mut self.links) {
            tracing::debug!(%transport, "stopping link");
            link.task.abort();
        }
    }
}

impl Drop for TerminalDriver {
    fn drop(&mut self) {
        self.stop();
        let _ = disable_raw_mode();
        let _ = stdout().execute(LeaveAlternateScreen);
    }
}

/// What a link does next.
enum LinkStep {
    Send(String),
    Close,
    Incoming(Option<Incoming>),
}

/// Own one WebSocket: connect, then pump frames both ways until either side
/// closes.
async fn run_link(
    url: String,
    transport: TransportId,
    mut outgoing: mpsc::UnboundedReceiver<String>,
    events: mpsc::UnboundedSender<TransportEvent>,
) {
    let mut socket = match websocket::connect(&url).await {
        Ok(socket) => socket,
        Err(e) => {
            tracing::warn!(%transport, error = %e, "connect failed");
            let _ = events.send(TransportEvent::Closed { transport, reason: e.to_string() });
            return;
        },
    };

    if events.send(TransportEvent::Opened { transport }).is_err() {
        return;
    }

    loop {
        let step = tokio::select! {
            text = outgoing.recv() => text.map_or(LinkStep::Close, LinkStep::Send),
            incoming = socket.recv() => LinkStep::Incoming(incoming),
        };

        match step {
            LinkStep::Send(text) => {
                if let Err(e) = socket.send(text).await {
                    tracing::debug!(%transport, error = %e, "socket task gone");
                }
            },
            LinkStep::Close => {
                socket.close();
                return;
            },
            LinkStep::Incoming(Some(Incoming::Frame(text))) => {
                if events.send(TransportEvent::Frame { transport, text }).is_err() {
                    return;
                }
            },
            LinkStep::Incoming(Some(Incoming::Closed { reason })) => {
                let _ = events.send(TransportEvent::Closed { transport, reason });
                return;
            },
            LinkStep::Incoming(None) => {
                let _ = events
                    .send(TransportEvent::Closed { transport, reason: "transport ended".into() });
                return;
            },
        }
    }
}
