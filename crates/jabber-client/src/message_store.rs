//! Ordered, deduplicated message log.
//!
//! Messages are kept in receipt order; the store never reorders by timestamp
//! or id. Each message owns its read-receipt set, which only changes through
//! a wholesale replacement from the server.

use std::collections::{BTreeSet, HashMap};

use jabber_proto::{MessageRecord, SYSTEM_SENDER};
use serde::Serialize;

/// One chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    /// Server-assigned id, immutable
    pub id: String,
    /// Sender identity, or [`SYSTEM_SENDER`]
    pub sender: String,
    /// Display timestamp, opaque
    pub timestamp: String,
    /// Message text, opaque
    pub text: String,
    /// Identities that have read the message, never including the sender
    pub read_by: BTreeSet<String>,
}

impl Message {
    /// True for server-generated notices.
    pub fn is_system(&self) -> bool {
        self.sender == SYSTEM_SENDER
    }
}

impl From<MessageRecord> for Message {
    fn from(record: MessageRecord) -> Self {
        Self {
            id: record.id,
            sender: record.sender,
            timestamp: record.timestamp,
            text: record.text,
            read_by: BTreeSet::new(),
        }
    }
}

/// Message log.
///
/// # Invariants
///
/// - Ids are unique
/// - Order is receipt order
/// - Mutation only through [`Self::apply_new_message`] and
///   [`Self::apply_read_update`]
#[derive(Debug, Clone, Default)]
pub struct MessageStore {
    messages: Vec<Message>,
    /// Id to position in `messages`
    index: HashMap<String, usize>,
}

impl MessageStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message unless its id is already present.
    ///
    /// Returns `true` if the message was appended.
    pub fn apply_new_message(&mut self, record: MessageRecord) -> bool {
        if self.index.contains_key(&record.id) {
            return false;
        }

        self.index.insert(record.id.clone(), self.messages.len());
        self.messages.push(Message::from(record));
        true
    }

    /// Replace the reader set of message `id`.
    ///
    /// The sender is filtered out of `readers`. Returns `false` when `id` is
    /// unknown; that is a benign race, not an error.
    pub fn apply_read_update<R>(&mut self, id: &str, readers: R) -> bool
    where
        R: IntoIterator<Item = String>,
    {
        let Some(&position) = self.index.get(id) else {
            return false;
        };
        let message = &mut self.messages[position];

        message.read_by = readers.into_iter().filter(|reader| *reader != message.sender).collect();
        true
    }

    /// Message with this id.
    pub fn get(&self, id: &str) -> Option<&Message> {
        self.index.get(id).map(|&position| &self.messages[position])
    }

    /// Messages in receipt order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// True if the store holds no messages.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Drop every message.
    pub fn clear(&mut self) {
        self.messages.clear();
        self.index.clear();
    }
}
