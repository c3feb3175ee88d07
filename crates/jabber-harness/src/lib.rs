//! Deterministic simulation harness for Jabber client testing.
//!
//! In-memory implementations of the server, the clock and the I/O driver so
//! the production [`jabber_app::Runtime`] can run end-to-end without a
//! network or wall-clock waits.
//!
//! # Components
//!
//! - [`SimEnv`]: virtual clock that only moves when a test advances it
//! - [`SimServer`]: reference server speaking the wire protocol
//! - [`SimDriver`]: [`jabber_app::Driver`] backed by a shared [`SimServer`]
//! - [`ChatCluster`]: several runtimes sharing one server
//!
//! # Invariant Testing
//!
//! The `invariants` module provides behavioral testing through invariant
//! checks. Invariants verify WHAT must be true across all execution paths, not
//! specific scenarios. Use [`InvariantRegistry::standard()`] for the chat
//! state invariants.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cluster;
pub mod invariants;
pub mod sim_driver;
pub mod sim_env;
pub mod sim_server;

pub use cluster::ChatCluster;
pub use invariants::{
    ClientSnapshot, Invariant, InvariantRegistry, InvariantResult, PhaseIdentityConsistency,
    ReadersExcludeSender, SelfNeverTyping, SystemSnapshot, TeardownCompleteness,
    UniqueMessageIds, Violation,
};
pub use sim_driver::{SimDriver, SimDriverError};
pub use sim_env::{SimEnv, SimInstant};
pub use sim_server::{ConnId, SharedSimServer, SimServer, create_shared_server};
