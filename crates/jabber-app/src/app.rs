//! Application state machine.
//!
//! This module defines the [`App`] state machine, which manages the interactive
//! state of the application completely decoupled from I/O and protocol
//! mechanics.
//!
//! This is a pure state machine: it consumes [`crate::AppEvent`] inputs and
//! produces [`crate::AppAction`] instructions for the runtime to execute.
//!
//! # Responsibilities
//!
//! - Owns the input line and turns Enter into commands or messages.
//! - Holds the latest [`ChatSnapshot`] for rendering.
//! - Tracks scroll offset, terminal dimensions and the status line.
//! - Reports newly visible messages at most once per session.

use std::collections::HashSet;

use jabber_client::{ChatSnapshot, Phase};

use crate::{
    AppAction, AppEvent, InputBuffer, KeyInput,
    command::{self, Command},
};

/// Application state machine.
///
/// Pure state machine that processes events and produces actions.
/// No I/O dependencies - fully testable in simulation.
#[derive(Debug, Clone)]
pub struct App {
    /// Latest chat state from the bridge.
    snapshot: ChatSnapshot,
    /// Input line being edited.
    input: InputBuffer,
    /// Messages scrolled back from the bottom.
    scroll: usize,
    /// Terminal dimensions (columns, rows).
    terminal_size: (u16, u16),
    /// Transient status message. `None` if no message.
    status_message: Option<String>,
    /// Server URL, for display.
    server_url: String,
    /// Username to connect with on start.
    username: Option<String>,
    /// Message ids already reported visible this session.
    reported: HashSet<String>,
}

impl App {
    /// Create a new App for `server_url`, optionally connecting as
    /// `username` on start.
    pub fn new(server_url: impl Into<String>, username: Option<String>) -> Self {
        Self {
            snapshot: ChatSnapshot::default(),
            input: InputBuffer::new(),
            scroll: 0,
            terminal_size: (80, 24),
            status_message: None,
            server_url: server_url.into(),
            username: username.filter(|name| !name.trim().is_empty()),
            reported: HashSet::new(),
        }
    }

    /// Initial actions: auto-connect if a username was configured, then
    /// render.
    pub fn start(&mut self) -> Vec<AppAction> {
        match self.username.clone() {
            Some(identity) => self.connect(identity),
            None => {
                self.status_message = Some("Type a username and press Enter".into());
                vec![AppAction::Render]
            },
        }
    }

    /// Process an event and return actions.
    pub fn handle(&mut self, event: AppEvent) -> Vec<AppAction> {
        match event {
            AppEvent::Key(key) => self.handle_key(key),
            AppEvent::Tick => vec![],
            AppEvent::Resize(cols, rows) => {
                self.terminal_size = (cols, rows);
                vec![AppAction::Render]
            },
            AppEvent::Snapshot(snapshot) => self.apply_snapshot(snapshot),
            AppEvent::Error { message } => {
                self.status_message = Some(format!("Error: {message}"));
                vec![AppAction::Render]
            },
        }
    }

    /// Report the ids of messages currently on screen.
    ///
    /// Own messages and ids already reported this session are dropped.
    /// Nothing is reported without a confirmed session.
    pub fn visible(&mut self, ids: Vec<String>) -> Vec<AppAction> {
        if !self.snapshot.is_connected() {
            return vec![];
        }

        let fresh: Vec<String> = ids
            .into_iter()
            .filter(|id| {
                self.snapshot
                    .messages
                    .iter()
                    .find(|message| &message.id == id)
                    .is_some_and(|message| !self.snapshot.is_own(message))
            })
            .filter(|id| self.reported.insert(id.clone()))
            .collect();

        if fresh.is_empty() { vec![] } else { vec![AppAction::MessagesVisible { ids: fresh }] }
    }

    /// Set a status message to display to the user.
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    fn handle_key(&mut self, key: KeyInput) -> Vec<AppAction> {
        match key {
            KeyInput::Esc => vec![AppAction::Quit],
            KeyInput::Enter => self.submit(),
            KeyInput::Char(c) => {
                self.input.insert(c);
                vec![AppAction::InputChanged, AppAction::Render]
            },
            KeyInput::Backspace => {
                if self.input.backspace() {
                    vec![AppAction::InputChanged, AppAction::Render]
                } else {
                    vec![]
                }
            },
            KeyInput::Delete => {
                if self.input.delete() {
                    vec![AppAction::InputChanged, AppAction::Render]
                } else {
                    vec![]
                }
            },
            KeyInput::Left => {
                self.input.left();
                vec![AppAction::Render]
            },
            KeyInput::Right => {
                self.input.right();
                vec![AppAction::Render]
            },
            KeyInput::Home => {
                self.input.home();
                vec![AppAction::Render]
            },
            KeyInput::End => {
                self.input.end();
                vec![AppAction::Render]
            },
            KeyInput::Up => {
                let max = self.snapshot.messages.len().saturating_sub(1);
                self.scroll = (self.scroll + 1).min(max);
                vec![AppAction::Render]
            },
            KeyInput::Down => {
                self.scroll = self.scroll.saturating_sub(1);
                vec![AppAction::Render]
            },
        }
    }

    fn submit(&mut self) -> Vec<AppAction> {
        let command = match command::parse(self.input.as_str()) {
            Ok(Some(command)) => command,
            Ok(None) => return vec![],
            Err(e) => {
                self.status_message = Some(e.to_string());
                return vec![AppAction::Render];
            },
        };

        match command {
            Command::Quit => vec![AppAction::Quit],
            Command::Connect(identity) => {
                self.input.clear();
                self.connect(identity)
            },
            Command::Disconnect => {
                self.input.clear();
                if self.snapshot.phase == Phase::Disconnected {
                    self.status_message = Some("Not connected".into());
                    vec![AppAction::Render]
                } else {
                    vec![AppAction::Disconnect, AppAction::Render]
                }
            },
            Command::Text(text) => match self.snapshot.phase {
                Phase::Disconnected => {
                    self.input.clear();
                    self.connect(text.trim().to_string())
                },
                Phase::Connecting => {
                    self.status_message = Some("Still connecting...".into());
                    vec![AppAction::Render]
                },
                Phase::Connected => {
                    self.input.clear();
                    self.scroll = 0;
                    vec![AppAction::SendMessage { text }, AppAction::Render]
                },
            },
        }
    }

    fn connect(&mut self, identity: String) -> Vec<AppAction> {
        self.status_message = Some(format!("Connecting as {identity}..."));
        vec![AppAction::Connect { identity }, AppAction::Render]
    }

    fn apply_snapshot(&mut self, snapshot: ChatSnapshot) -> Vec<AppAction> {
        let previous = self.snapshot.phase;
        if previous == Phase::Connected && snapshot.phase != Phase::Connected {
            self.reported.clear();
        }

        let session_changed = previous != snapshot.phase
            || self.snapshot.local_identity != snapshot.local_identity;
        if session_changed {
            let identity = snapshot.local_identity.as_deref().unwrap_or_default();
            self.status_message = Some(match snapshot.phase {
                Phase::Disconnected => "Disconnected".to_string(),
                Phase::Connecting => format!("Connecting as {identity}..."),
                Phase::Connected => format!("Connected as {identity}"),
            });
        }

        let max = snapshot.messages.len().saturating_sub(1);
        self.scroll = self.scroll.min(max);
        self.snapshot = snapshot;
        vec![AppAction::Render]
    }

    /// Latest chat state.
    pub fn snapshot(&self) -> &ChatSnapshot {
        &self.snapshot
    }

    /// Session phase as last published.
    pub fn phase(&self) -> Phase {
        self.snapshot.phase
    }

    /// Input line being edited.
    pub fn input(&self) -> &InputBuffer {
        &self.input
    }

    /// Messages scrolled back from the bottom.
    pub fn scroll(&self) -> usize {
        self.scroll
    }

    /// Server URL.
    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    /// Terminal dimensions (columns, rows).
    pub fn terminal_size(&self) -> (u16, u16) {
        self.terminal_size
    }

    /// Transient status message. `None` if no message.
    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }
}
