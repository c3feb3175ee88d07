//! Client events and actions.

use jabber_core::TransportId;
use jabber_proto::ClientFrame;

/// Events the caller feeds into the client.
///
/// The caller is responsible for:
/// - Executing transport actions and reporting the outcome back
/// - Driving time forward via ticks
/// - Forwarding user intents (connect, send, input, visibility)
///
/// Generic over `I` (Instant type) to support both production
/// (`std::time::Instant`) and simulation (virtual) clocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent<I = std::time::Instant> {
    /// User wants to join the chat.
    ///
    /// Tears down any active session first.
    Connect {
        /// Requested identity; the server may assign a different one.
        identity: String,
    },

    /// User wants to leave the chat.
    Disconnect,

    /// Transport finished opening.
    TransportOpened {
        /// Transport the callback belongs to.
        transport: TransportId,
    },

    /// Text frame received from the server.
    FrameReceived {
        /// Transport the frame arrived on.
        transport: TransportId,
        /// Raw wire text.
        text: String,
    },

    /// Transport closed or failed.
    TransportClosed {
        /// Transport the callback belongs to.
        transport: TransportId,
        /// Human-readable cause, for logs.
        reason: String,
    },

    /// Content of the input box changed.
    InputChanged {
        /// Current time from the environment.
        now: I,
    },

    /// User submitted a chat message.
    SendMessage {
        /// Message text, sent verbatim.
        text: String,
    },

    /// A message became visible to the user.
    MessageVisible {
        /// Id of the visible message.
        message_id: String,
    },

    /// Time tick for the typing debounce.
    ///
    /// The caller should send ticks periodically; the debounce fires on the
    /// first tick past its deadline.
    Tick {
        /// Current time from the environment.
        now: I,
    },
}

/// Part of the chat state that changed.
///
/// Observers use this to decide what to re-read from the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Change {
    /// Phase or local identity
    Session,
    /// Message log or read receipts
    Messages,
    /// Online user list
    Presence,
    /// Typing peers
    Typing,
}

/// Actions the client produces for the caller to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientAction {
    /// Open a new transport and report back with this id.
    OpenTransport(TransportId),

    /// Encode and write a frame to a transport.
    Send {
        /// Destination transport.
        transport: TransportId,
        /// Frame to send.
        frame: ClientFrame,
    },

    /// Close a transport.
    CloseTransport(TransportId),

    /// State observable through the snapshot changed.
    Notify(Change),
}
