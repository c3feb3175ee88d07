//! Immutable view of the chat state.

use jabber_core::Phase;
use serde::Serialize;

use crate::{message_store::Message, typing};

/// Owned copy of everything an observer can render.
///
/// Taken after each processed event; never aliases engine state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatSnapshot {
    /// Session phase
    pub phase: Phase,
    /// Local identity; requested while connecting, confirmed once connected
    pub local_identity: Option<String>,
    /// Messages in receipt order
    pub messages: Vec<Message>,
    /// Online users in server order
    pub presence: Vec<String>,
    /// Remote peers currently typing
    pub typing: Vec<String>,
}

impl Default for ChatSnapshot {
    fn default() -> Self {
        Self {
            phase: Phase::Disconnected,
            local_identity: None,
            messages: Vec::new(),
            presence: Vec::new(),
            typing: Vec::new(),
        }
    }
}

impl ChatSnapshot {
    /// True once the server confirmed the session.
    pub fn is_connected(&self) -> bool {
        self.phase == Phase::Connected
    }

    /// Typing status line, `None` when nobody is typing.
    pub fn typing_line(&self) -> Option<String> {
        typing::describe(&self.typing)
    }

    /// True if `message` was authored by the local user.
    pub fn is_own(&self, message: &Message) -> bool {
        self.local_identity.as_deref() == Some(message.sender.as_str())
    }
}
