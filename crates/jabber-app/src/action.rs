//! Application side-effects and intents.
//!
//! This module defines the [`AppAction`] enum, which represents instructions
//! produced by the [`crate::App`] state machine for the runtime to execute.

/// Actions produced by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    /// Render the UI.
    Render,

    /// Quit the application.
    Quit,

    /// Join the chat, tearing down any current session.
    Connect {
        /// Requested username.
        identity: String,
    },

    /// Leave the chat.
    Disconnect,

    /// Send a chat message.
    SendMessage {
        /// Message text as typed.
        text: String,
    },

    /// The input line was edited.
    InputChanged,

    /// Messages from other users entered the viewport.
    MessagesVisible {
        /// Ids not reported before in this session.
        ids: Vec<String>,
    },
}
