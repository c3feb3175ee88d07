//! Raw frame splitting.
//!
//! A [`RawFrame`] is the first decoding stage: it validates the `TYPE:PAYLOAD`
//! envelope and recognizes the type, but leaves the payload untouched. Typed
//! decoding happens in [`crate::ClientFrame`] and [`crate::ServerFrame`].

use std::fmt;

use crate::{
    FrameKind,
    errors::{ProtocolError, Result},
};

/// Separates frame type from payload.
pub const KIND_SEPARATOR: char = ':';

/// Separates fields inside compound payloads.
pub const FIELD_SEPARATOR: &str = "::";

/// Separates entries in identity lists.
pub const LIST_SEPARATOR: char = ',';

/// Separates records in a history payload.
pub const RECORD_SEPARATOR: char = '\n';

/// A frame split into its type and unparsed payload.
///
/// # Invariants
///
/// - `kind` is a recognized [`FrameKind`]; unknown types never produce a
///   `RawFrame`.
/// - `payload` is everything after the first `:`, including further colons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawFrame<'a> {
    /// Frame type
    pub kind: FrameKind,
    /// Payload text after the first separator
    pub payload: &'a str,
}

impl<'a> RawFrame<'a> {
    /// Create a raw frame.
    pub fn new(kind: FrameKind, payload: &'a str) -> Self {
        Self { kind, payload }
    }

    /// Split `text` on its first `:` and recognize the type.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::MissingDelimiter` if there is no `:`
    /// - `ProtocolError::UnknownKind` if the type is not part of the protocol
    pub fn parse(text: &'a str) -> Result<Self> {
        let (kind, payload) =
            text.split_once(KIND_SEPARATOR).ok_or(ProtocolError::MissingDelimiter)?;

        let kind =
            FrameKind::from_wire(kind).ok_or_else(|| ProtocolError::UnknownKind(kind.to_string()))?;

        Ok(Self { kind, payload })
    }
}

impl fmt::Display for RawFrame<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{KIND_SEPARATOR}{}", self.kind, self.payload)
    }
}

/// Split an identity list, discarding blank entries.
///
/// Entries are kept verbatim (not trimmed); only entries that are empty or
/// whitespace-only are dropped.
pub(crate) fn split_list(payload: &str) -> Vec<String> {
    payload
        .split(LIST_SEPARATOR)
        .filter(|entry| !entry.trim().is_empty())
        .map(str::to_string)
        .collect()
}

/// Join an identity list for the wire.
pub(crate) fn join_list(entries: &[String]) -> String {
    let mut out = String::new();
    for (i, entry) in entries.iter().enumerate() {
        if i > 0 {
            out.push(LIST_SEPARATOR);
        }
        out.push_str(entry);
    }
    out
}

/// Reject empty required fields.
pub(crate) fn non_empty<'a>(kind: FrameKind, field: &'static str, value: &'a str) -> Result<&'a str> {
    if value.is_empty() { Err(ProtocolError::EmptyField { kind, field }) } else { Ok(value) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_first_colon_only() {
        let raw = RawFrame::parse("MESSAGE:see you at 10:30: ok").unwrap();
        assert_eq!(raw.kind, FrameKind::Message);
        assert_eq!(raw.payload, "see you at 10:30: ok");
    }

    #[test]
    fn empty_payload_is_allowed() {
        let raw = RawFrame::parse("USERS:").unwrap();
        assert_eq!(raw.kind, FrameKind::Users);
        assert_eq!(raw.payload, "");
    }

    #[test]
    fn missing_colon_is_rejected() {
        assert_eq!(RawFrame::parse("USERS"), Err(ProtocolError::MissingDelimiter));
        assert_eq!(RawFrame::parse(""), Err(ProtocolError::MissingDelimiter));
    }

    #[test]
    fn unknown_type_is_reported() {
        assert_eq!(
            RawFrame::parse("BROADCAST:hello"),
            Err(ProtocolError::UnknownKind("BROADCAST".to_string()))
        );
    }

    #[test]
    fn display_restores_wire_text() {
        let raw = RawFrame::new(FrameKind::Read, "m7");
        assert_eq!(raw.to_string(), "READ:m7");
    }

    #[test]
    fn list_drops_blank_entries_and_keeps_order() {
        assert_eq!(split_list("carol, ,alice,,bob"), vec!["carol", "alice", "bob"]);
        assert!(split_list("").is_empty());
        assert!(split_list(" , ").is_empty());
    }

    #[test]
    fn list_join_matches_split() {
        let users = vec!["alice".to_string(), "bob".to_string()];
        assert_eq!(join_list(&users), "alice,bob");
        assert_eq!(split_list(&join_list(&users)), users);
        assert_eq!(join_list(&[]), "");
    }
}
