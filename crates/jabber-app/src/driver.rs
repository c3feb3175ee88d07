//! Driver trait for abstracting I/O operations.
//!
//! The [`Driver`] trait decouples the application runtime from specific I/O
//! implementations. Each frontend implements the trait to provide
//! platform-specific I/O, while the generic [`crate::Runtime`] handles all
//! orchestration.

use std::{future::Future, ops::Sub, time::Duration};

use jabber_core::TransportId;

use crate::{App, AppEvent};

/// Something a transport reported.
///
/// Every event names the transport it came from so the client can drop
/// callbacks from a transport it already abandoned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// The transport is open and ready for frames.
    Opened {
        /// Which transport.
        transport: TransportId,
    },
    /// A text frame arrived.
    Frame {
        /// Which transport.
        transport: TransportId,
        /// Raw frame text.
        text: String,
    },
    /// The transport closed or failed to open. Nothing follows.
    Closed {
        /// Which transport.
        transport: TransportId,
        /// Human-readable cause.
        reason: String,
    },
}

/// Abstracts I/O operations for the application runtime.
///
/// Implementations provide platform-specific I/O while the generic
/// [`Runtime`](crate::Runtime) handles orchestration logic. This ensures
/// the same orchestration code runs in production TUI and simulation.
///
/// # Implementations
///
/// - **TUI**: crossterm for terminal events, tokio-tungstenite for WebSocket
/// - **Simulation**: in-memory server with a virtual clock
pub trait Driver: Send {
    /// Platform-specific error type.
    type Error: std::error::Error + Send + 'static;

    /// Time instant type. Enables virtual time in simulation.
    type Instant: Copy + Ord + Send + Sync + Sub<Output = Duration>;

    /// Poll for the next input event.
    ///
    /// Returns `None` if no event is ready.
    fn poll_event(&mut self) -> impl Future<Output = Result<Option<AppEvent>, Self::Error>> + Send;

    /// Start opening `transport`.
    ///
    /// The outcome arrives later through [`Self::recv`] as `Opened` or
    /// `Closed`.
    fn open(&mut self, transport: TransportId) -> impl Future<Output = ()> + Send;

    /// Send a text frame on `transport`.
    ///
    /// A failed send is reported through [`Self::recv`] as `Closed`; frames
    /// for unknown transports are dropped.
    fn send_text(
        &mut self,
        transport: TransportId,
        text: String,
    ) -> impl Future<Output = ()> + Send;

    /// Next pending transport event, `None` if nothing is pending.
    fn recv(&mut self) -> impl Future<Output = Option<TransportEvent>> + Send;

    /// Close `transport`. No further events are reported for it.
    fn close(&mut self, transport: TransportId);

    /// Current time instant.
    fn now(&self) -> Self::Instant;

    /// Render the application state.
    ///
    /// Returns the ids of messages visible in the viewport.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    fn render(&mut self, app: &App) -> Result<Vec<String>, Self::Error>;

    /// Stop all transports and clean up resources.
    fn stop(&mut self);
}
