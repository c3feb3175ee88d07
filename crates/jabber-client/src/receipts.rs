//! Outbound read receipts.
//!
//! The visibility collaborator may report the same message many times. This
//! tracker turns those reports into at most one `READ` frame per message per
//! session, and never acknowledges the local user's own messages.

use std::collections::HashSet;

use jabber_proto::ClientFrame;

use crate::message_store::Message;

/// Record of receipts sent during the current session.
///
/// # Invariants
///
/// - Grows monotonically within a session
/// - Cleared when the session ends
#[derive(Debug, Clone, Default)]
pub struct ReadReceipts {
    sent: HashSet<String>,
}

impl ReadReceipts {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle `message` becoming visible to `local_identity`.
    ///
    /// Returns the `READ` frame to send, or `None` for self-authored or
    /// already-acknowledged messages.
    pub fn on_visible(&mut self, message: &Message, local_identity: &str) -> Option<ClientFrame> {
        if message.sender == local_identity {
            return None;
        }

        self.sent
            .insert(message.id.clone())
            .then(|| ClientFrame::Read { message_id: message.id.clone() })
    }

    /// True if a receipt for `message_id` went out this session.
    pub fn has_sent(&self, message_id: &str) -> bool {
        self.sent.contains(message_id)
    }

    /// Number of receipts sent this session.
    pub fn len(&self) -> usize {
        self.sent.len()
    }

    /// True if no receipt went out this session.
    pub fn is_empty(&self) -> bool {
        self.sent.is_empty()
    }

    /// Forget all receipts.
    pub fn clear(&mut self) {
        self.sent.clear();
    }
}

#[cfg(test)]
mod tests {
    use jabber_proto::MessageRecord;

    use super::*;

    fn message(id: &str, sender: &str) -> Message {
        Message::from(MessageRecord::new(id, sender, "10:00", "hi"))
    }

    #[test]
    fn first_sighting_sends_receipt() {
        let mut receipts = ReadReceipts::new();

        let frame = receipts.on_visible(&message("m1", "bob"), "alice");

        assert_eq!(frame, Some(ClientFrame::Read { message_id: "m1".into() }));
        assert!(receipts.has_sent("m1"));
    }

    #[test]
    fn repeated_sightings_send_once() {
        let mut receipts = ReadReceipts::new();
        let msg = message("m1", "bob");

        let sent = (0..5).filter_map(|_| receipts.on_visible(&msg, "alice")).count();

        assert_eq!(sent, 1);
    }

    #[test]
    fn own_messages_are_never_acknowledged() {
        let mut receipts = ReadReceipts::new();

        assert_eq!(receipts.on_visible(&message("m1", "alice"), "alice"), None);
        assert!(receipts.is_empty());
    }

    #[test]
    fn clear_allows_new_session_receipts() {
        let mut receipts = ReadReceipts::new();
        let msg = message("m1", "bob");
        receipts.on_visible(&msg, "alice");

        receipts.clear();

        assert!(receipts.on_visible(&msg, "alice").is_some());
    }
}
