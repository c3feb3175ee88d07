//! Application layer for Jabber
//!
//! Pure state machines and generic runtime for UI and protocol orchestration,
//! enabling deterministic simulation testing with the same code that runs in
//! production.
//!
//! # Components
//!
//! - [`App`]: UI state machine (input line, commands, scrolling, status)
//! - [`Bridge`]: Protocol bridge (translates App actions to Client events)
//! - [`Driver`]: Trait for platform-specific I/O abstraction
//! - [`Runtime`]: Generic orchestration loop using Driver

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod action;
mod app;
mod bridge;
pub mod command;
mod driver;
mod event;
mod input;
mod runtime;

pub use action::AppAction;
pub use app::App;
pub use bridge::{Bridge, TransportCommand};
pub use command::{Command, CommandError};
pub use driver::{Driver, TransportEvent};
pub use event::AppEvent;
pub use input::{InputBuffer, KeyInput};
pub use runtime::Runtime;
