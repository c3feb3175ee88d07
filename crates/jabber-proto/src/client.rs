//! Client-to-server frames.

use crate::{
    FrameKind, RawFrame,
    errors::{ProtocolError, Result},
    frame::non_empty,
};

/// Frames the client sends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientFrame {
    /// `CONNECT:<identity>`
    Connect {
        /// Requested identity
        identity: String,
    },
    /// `DISCONNECT:<identity>`
    Disconnect {
        /// Identity leaving the chat
        identity: String,
    },
    /// `MESSAGE:<text>`
    Message {
        /// Message text, sent verbatim
        text: String,
    },
    /// `TYPING:true|false`
    Typing {
        /// Whether the local user is typing
        active: bool,
    },
    /// `READ:<message id>`
    Read {
        /// Id of the message that was seen
        message_id: String,
    },
}

impl ClientFrame {
    /// Frame type of this variant.
    pub fn kind(&self) -> FrameKind {
        match self {
            Self::Connect { .. } => FrameKind::Connect,
            Self::Disconnect { .. } => FrameKind::Disconnect,
            Self::Message { .. } => FrameKind::Message,
            Self::Typing { .. } => FrameKind::Typing,
            Self::Read { .. } => FrameKind::Read,
        }
    }

    /// Encode to wire text. Never fails.
    pub fn encode(&self) -> String {
        let payload = match self {
            Self::Connect { identity } | Self::Disconnect { identity } => identity.as_str(),
            Self::Message { text } => text.as_str(),
            Self::Typing { active } => bool_str(*active),
            Self::Read { message_id } => message_id.as_str(),
        };
        RawFrame::new(self.kind(), payload).to_string()
    }

    /// Decode a frame sent by a client.
    ///
    /// Used by the server side of the simulation harness.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::MissingDelimiter` / `UnknownKind` for bad envelopes or
    ///   server-only types
    /// - `ProtocolError::EmptyField` for empty identities or message ids
    /// - `ProtocolError::InvalidBool` for a `TYPING` flag other than
    ///   `true`/`false`
    pub fn decode(text: &str) -> Result<Self> {
        let raw = RawFrame::parse(text)?;
        let RawFrame { kind, payload } = raw;

        match kind {
            FrameKind::Connect => {
                Ok(Self::Connect { identity: non_empty(kind, "identity", payload)?.to_string() })
            },
            FrameKind::Disconnect => {
                Ok(Self::Disconnect { identity: non_empty(kind, "identity", payload)?.to_string() })
            },
            FrameKind::Message => Ok(Self::Message { text: payload.to_string() }),
            FrameKind::Typing => match payload {
                "true" => Ok(Self::Typing { active: true }),
                "false" => Ok(Self::Typing { active: false }),
                other => Err(ProtocolError::InvalidBool(other.to_string())),
            },
            FrameKind::Read => {
                Ok(Self::Read { message_id: non_empty(kind, "message id", payload)?.to_string() })
            },
            FrameKind::Connected
            | FrameKind::NewMessage
            | FrameKind::ReadUpdate
            | FrameKind::Users
            | FrameKind::Messages => Err(ProtocolError::UnknownKind(kind.as_str().to_string())),
        }
    }
}

pub(crate) const fn bool_str(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_outbound_frames() {
        assert_eq!(ClientFrame::Connect { identity: "alice".into() }.encode(), "CONNECT:alice");
        assert_eq!(
            ClientFrame::Disconnect { identity: "alice".into() }.encode(),
            "DISCONNECT:alice"
        );
        assert_eq!(ClientFrame::Message { text: "a: b".into() }.encode(), "MESSAGE:a: b");
        assert_eq!(ClientFrame::Typing { active: true }.encode(), "TYPING:true");
        assert_eq!(ClientFrame::Typing { active: false }.encode(), "TYPING:false");
        assert_eq!(ClientFrame::Read { message_id: "m1".into() }.encode(), "READ:m1");
    }

    #[test]
    fn message_text_keeps_colons() {
        let frame = ClientFrame::decode("MESSAGE:ratio is 1:2").unwrap();
        assert_eq!(frame, ClientFrame::Message { text: "ratio is 1:2".into() });
    }

    #[test]
    fn typing_flag_is_strict() {
        assert_eq!(
            ClientFrame::decode("TYPING:yes"),
            Err(ProtocolError::InvalidBool("yes".to_string()))
        );
    }

    #[test]
    fn server_only_types_are_unknown() {
        assert!(matches!(
            ClientFrame::decode("USERS:alice"),
            Err(ProtocolError::UnknownKind(kind)) if kind == "USERS"
        ));
    }

    #[test]
    fn empty_identity_is_rejected() {
        assert_eq!(
            ClientFrame::decode("CONNECT:"),
            Err(ProtocolError::EmptyField { kind: FrameKind::Connect, field: "identity" })
        );
    }
}
