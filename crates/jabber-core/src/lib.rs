//! Jabber protocol core.
//!
//! Sans-IO building blocks shared by the client engine and its drivers:
//!
//! - [`connection`]: session lifecycle state machine (connect handshake,
//!   disconnect, transport loss)
//! - [`env`]: clock abstraction so timers are testable without wall-clock
//!   waiting
//! - [`error`]: lifecycle errors

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod connection;
pub mod env;
pub mod error;
mod system_env;

pub use connection::{Connection, ConnectionAction, ConnectionState, Phase, TransportId};
pub use env::Environment;
pub use error::ConnectionError;
pub use system_env::SystemEnv;
