//! Frame type tags.

use std::fmt;

/// Wire `TYPE` of a frame.
///
/// `TYPING` travels in both directions and is a single kind; every other kind
/// is valid in exactly one direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameKind {
    /// Client announces its requested identity
    Connect,
    /// Client leaves the chat
    Disconnect,
    /// Client posts a chat message
    Message,
    /// Typing state (client: own flag, server: peer identity and flag)
    Typing,
    /// Client acknowledges reading a message
    Read,
    /// Server confirms the session identity
    Connected,
    /// Server delivers a message
    NewMessage,
    /// Server replaces the reader set of a message
    ReadUpdate,
    /// Server replaces the online user list
    Users,
    /// Server replays message history
    Messages,
}

impl FrameKind {
    /// All kinds, in declaration order.
    pub const ALL: [Self; 10] = [
        Self::Connect,
        Self::Disconnect,
        Self::Message,
        Self::Typing,
        Self::Read,
        Self::Connected,
        Self::NewMessage,
        Self::ReadUpdate,
        Self::Users,
        Self::Messages,
    ];

    /// Wire representation of this kind.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Connect => "CONNECT",
            Self::Disconnect => "DISCONNECT",
            Self::Message => "MESSAGE",
            Self::Typing => "TYPING",
            Self::Read => "READ",
            Self::Connected => "CONNECTED",
            Self::NewMessage => "NEW_MESSAGE",
            Self::ReadUpdate => "READ_UPDATE",
            Self::Users => "USERS",
            Self::Messages => "MESSAGES",
        }
    }

    /// Parse a wire `TYPE`. Matching is exact and case-sensitive.
    pub fn from_wire(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == s)
    }

    /// Valid in client-to-server frames.
    pub const fn is_client(self) -> bool {
        matches!(self, Self::Connect | Self::Disconnect | Self::Message | Self::Typing | Self::Read)
    }

    /// Valid in server-to-client frames.
    pub const fn is_server(self) -> bool {
        matches!(
            self,
            Self::Connected
                | Self::NewMessage
                | Self::ReadUpdate
                | Self::Users
                | Self::Typing
                | Self::Messages
        )
    }
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
