//! Client
//!
//! Action-based chat client engine for the Jabber protocol. Maintains a
//! locally consistent view of one conversation: the message log with read
//! receipts, the online user list, and who is currently typing.
//!
//! # Architecture
//!
//! The client follows the same Sans-IO and action-based patterns as
//! [`jabber_core`]. It receives events ([`ClientEvent`]), processes them
//! through pure state machine logic, and returns actions ([`ClientAction`])
//! for the caller to execute. Time only enters through event parameters, so
//! the typing debounce is testable without waiting.
//!
//! # Components
//!
//! - [`Client`]: top-level engine routing events to the components below
//! - [`MessageStore`]: ordered, deduplicated message log
//! - [`ReadReceipts`]: at-most-once outbound read receipts per session
//! - [`TypingDebounce`] / [`TypingIndicator`]: local typing signal and the
//!   aggregated set of typing peers
//! - [`Presence`]: online user list
//! - [`ChatSnapshot`]: immutable view handed to observers
//!
//! # Transport (optional)
//!
//! With the `transport` feature enabled, this crate also provides:
//! - [`transport::WebSocketTransport`]: text-frame WebSocket connection
//! - [`transport::connect`]: connect to a server

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod client;
mod config;
mod error;
mod event;
mod message_store;
mod presence;
mod receipts;
mod snapshot;
mod typing;

#[cfg(feature = "transport")]
pub mod transport;

pub use client::Client;
pub use config::{ClientConfig, DEFAULT_TYPING_DEBOUNCE};
pub use error::ClientError;
pub use event::{Change, ClientAction, ClientEvent};
pub use jabber_core::{Environment, Phase, TransportId};
pub use message_store::{Message, MessageStore};
pub use presence::Presence;
pub use receipts::ReadReceipts;
pub use snapshot::ChatSnapshot;
pub use typing::{TypingDebounce, TypingIndicator};
