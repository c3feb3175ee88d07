//! Error types for the Jabber session lifecycle.
//!
//! Lifecycle errors are split into operator mistakes (connecting twice,
//! disconnecting while idle) and benign races with the transport (callbacks
//! from a transport that has already been replaced, a duplicate handshake
//! confirmation). Drivers log and drop the benign ones.

use thiserror::Error;

use crate::connection::{Phase, TransportId};

/// Errors that can occur during connection state machine operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    /// Invalid state transition attempted
    #[error("invalid state transition: cannot {operation} while {phase}")]
    InvalidState {
        /// Phase when the error occurred
        phase: Phase,
        /// Operation that was attempted
        operation: &'static str,
    },

    /// Identity was empty or whitespace
    #[error("identity must not be empty")]
    EmptyIdentity,

    /// Callback came from a transport that is no longer current
    #[error("stale transport {transport}")]
    StaleTransport {
        /// Transport that produced the callback
        transport: TransportId,
    },

    /// Handshake confirmation received outside the handshake
    #[error("unexpected handshake confirmation while {phase}")]
    UnexpectedConfirmation {
        /// Phase when the confirmation arrived
        phase: Phase,
    },
}

impl ConnectionError {
    /// Returns true if this error is an expected race with the transport.
    ///
    /// Benign errors carry no user-facing meaning: the event that produced
    /// them should be logged and discarded. Everything else is a caller
    /// mistake worth reporting.
    pub fn is_benign(&self) -> bool {
        matches!(self, Self::StaleTransport { .. } | Self::UnexpectedConfirmation { .. })
    }
}
