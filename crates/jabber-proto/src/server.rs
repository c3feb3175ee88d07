//! Server-to-client frames.

use serde::{Deserialize, Serialize};

use crate::{
    FIELD_SEPARATOR, FrameKind, LIST_SEPARATOR, RECORD_SEPARATOR, RawFrame,
    client::bool_str,
    errors::{ProtocolError, Result},
    frame::{join_list, non_empty, split_list},
};

/// Sender identity of system-generated messages (join/leave notices).
pub const SYSTEM_SENDER: &str = "System";

/// One chat message as carried by `NEW_MESSAGE` and `MESSAGES`.
///
/// Wire form: `id::sender::timestamp::text`. The text is everything after the
/// third separator and may itself contain `::`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageRecord {
    /// Server-assigned, unique, stable id
    pub id: String,
    /// Author identity, or [`SYSTEM_SENDER`]
    pub sender: String,
    /// Display timestamp; opaque, never used for ordering
    pub timestamp: String,
    /// Message content; opaque
    pub text: String,
}

impl MessageRecord {
    /// Create a record.
    pub fn new(
        id: impl Into<String>,
        sender: impl Into<String>,
        timestamp: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self { id: id.into(), sender: sender.into(), timestamp: timestamp.into(), text: text.into() }
    }

    /// Message was generated by the server rather than a user.
    pub fn is_system(&self) -> bool {
        self.sender == SYSTEM_SENDER
    }

    fn parse(kind: FrameKind, payload: &str) -> Result<Self> {
        let mut fields = payload.splitn(4, FIELD_SEPARATOR);

        let id = fields.next().ok_or(ProtocolError::MissingField { kind, field: "id" })?;
        let sender = fields.next().ok_or(ProtocolError::MissingField { kind, field: "sender" })?;
        let timestamp =
            fields.next().ok_or(ProtocolError::MissingField { kind, field: "timestamp" })?;
        let text = fields.next().ok_or(ProtocolError::MissingField { kind, field: "text" })?;

        let id = non_empty(kind, "id", id)?;

        Ok(Self::new(id, sender, timestamp, text))
    }

    fn encode_into(&self, out: &mut String) {
        for field in [&self.id, &self.sender, &self.timestamp] {
            out.push_str(field);
            out.push_str(FIELD_SEPARATOR);
        }
        out.push_str(&self.text);
    }
}

/// Frames the server sends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerFrame {
    /// `CONNECTED:<identity>`: the authoritative session identity
    Connected {
        /// Identity assigned by the server; may differ from the requested one
        identity: String,
    },

    /// `NEW_MESSAGE:<id>::<sender>::<timestamp>::<text>`
    NewMessage(MessageRecord),

    /// `READ_UPDATE:<id>::<reader>,<reader>,...`
    ReadUpdate {
        /// Message whose reader set is replaced
        message_id: String,
        /// Complete reader set; blank entries removed
        readers: Vec<String>,
    },

    /// `USERS:<identity>,<identity>,...`: complete online list in server order
    Users(Vec<String>),

    /// `TYPING:<identity>,<true|false>`
    Typing {
        /// Peer whose typing state changed
        identity: String,
        /// `true` only for the literal `true`; anything else means not typing
        active: bool,
    },

    /// `MESSAGES:<record>\n<record>...`: history replay
    History {
        /// Records that decoded successfully, in server order
        records: Vec<MessageRecord>,
        /// Number of malformed lines that were dropped
        skipped: usize,
    },
}

impl ServerFrame {
    /// Frame type of this variant.
    pub fn kind(&self) -> FrameKind {
        match self {
            Self::Connected { .. } => FrameKind::Connected,
            Self::NewMessage(_) => FrameKind::NewMessage,
            Self::ReadUpdate { .. } => FrameKind::ReadUpdate,
            Self::Users(_) => FrameKind::Users,
            Self::Typing { .. } => FrameKind::Typing,
            Self::History { .. } => FrameKind::Messages,
        }
    }

    /// Decode a frame received from the server.
    ///
    /// Total over all inputs: every string yields either a frame or an error,
    /// never a partially-populated frame and never a panic.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::MissingDelimiter` if there is no `:`
    /// - `ProtocolError::UnknownKind` for unrecognized or client-only types
    /// - `ProtocolError::MissingField` if a compound payload is short
    /// - `ProtocolError::EmptyField` for empty identities or message ids
    pub fn decode(text: &str) -> Result<Self> {
        let RawFrame { kind, payload } = RawFrame::parse(text)?;

        match kind {
            FrameKind::Connected => {
                Ok(Self::Connected { identity: non_empty(kind, "identity", payload)?.to_string() })
            },
            FrameKind::NewMessage => Ok(Self::NewMessage(MessageRecord::parse(kind, payload)?)),
            FrameKind::ReadUpdate => {
                let (message_id, readers) = payload
                    .split_once(FIELD_SEPARATOR)
                    .ok_or(ProtocolError::MissingField { kind, field: "readers" })?;
                let message_id = non_empty(kind, "message id", message_id)?;

                Ok(Self::ReadUpdate {
                    message_id: message_id.to_string(),
                    readers: split_list(readers),
                })
            },
            FrameKind::Users => Ok(Self::Users(split_list(payload))),
            FrameKind::Typing => {
                // No comma means the state is unknown, which reads as "not typing".
                let (identity, state) = payload.split_once(LIST_SEPARATOR).unwrap_or((payload, ""));
                let identity = non_empty(kind, "identity", identity)?;

                Ok(Self::Typing { identity: identity.to_string(), active: state == "true" })
            },
            FrameKind::Messages => {
                let mut records = Vec::new();
                let mut skipped = 0;

                for line in payload.split(RECORD_SEPARATOR) {
                    if line.trim().is_empty() {
                        continue;
                    }
                    match MessageRecord::parse(FrameKind::NewMessage, line) {
                        Ok(record) => records.push(record),
                        Err(_) => skipped += 1,
                    }
                }

                Ok(Self::History { records, skipped })
            },
            FrameKind::Connect | FrameKind::Disconnect | FrameKind::Message | FrameKind::Read => {
                Err(ProtocolError::UnknownKind(kind.as_str().to_string()))
            },
        }
    }

    /// Encode to wire text. Never fails.
    ///
    /// Used by the simulation server and tests.
    pub fn encode(&self) -> String {
        let mut payload = String::new();

        match self {
            Self::Connected { identity } => payload.push_str(identity),
            Self::NewMessage(record) => record.encode_into(&mut payload),
            Self::ReadUpdate { message_id, readers } => {
                payload.push_str(message_id);
                payload.push_str(FIELD_SEPARATOR);
                payload.push_str(&join_list(readers));
            },
            Self::Users(users) => payload.push_str(&join_list(users)),
            Self::Typing { identity, active } => {
                payload.push_str(identity);
                payload.push(LIST_SEPARATOR);
                payload.push_str(bool_str(*active));
            },
            Self::History { records, .. } => {
                for (i, record) in records.iter().enumerate() {
                    if i > 0 {
                        payload.push(RECORD_SEPARATOR);
                    }
                    record.encode_into(&mut payload);
                }
            },
        }

        RawFrame::new(self.kind(), &payload).to_string()
    }
}
