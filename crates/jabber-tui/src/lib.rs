//! Terminal UI for Jabber
//!
//! A thin shell over [`jabber_app::Driver`] that provides terminal-specific
//! I/O. All orchestration logic lives in the generic [`jabber_app::Runtime`].
//!
//! This crate only handles terminal rendering, key mapping and the
//! WebSocket links behind each transport id.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod keys;
pub mod terminal;
pub mod ui;

pub use jabber_app::{App, AppAction, AppEvent, Bridge, Driver, KeyInput, Runtime};
pub use terminal::{TerminalDriver, TerminalError};

/// Server the client talks to when none is given.
pub const DEFAULT_SERVER_URL: &str = "ws://localhost:8080";

/// Log destination when none is given. The terminal belongs to the UI.
pub const DEFAULT_LOG_FILE: &str = "jabber-tui.log";
