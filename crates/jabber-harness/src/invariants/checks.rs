//! Standard invariant checks.
//!
//! These invariants capture behavioral properties that must always hold.
//! They verify WHAT must be true, not specific test scenarios.

use std::collections::HashSet;

use jabber_client::Phase;

use super::{Invariant, InvariantResult, SystemSnapshot, Violation};

/// Local identity is present exactly when a session exists.
///
/// Connecting and Connected both carry a non-empty identity (requested or
/// confirmed); Disconnected carries none.
pub struct PhaseIdentityConsistency;

impl Invariant for PhaseIdentityConsistency {
    fn name(&self) -> &'static str {
        "phase_identity_consistency"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for client in &state.clients {
            let has_identity =
                client.chat.local_identity.as_deref().is_some_and(|identity| !identity.is_empty());
            let in_session = client.chat.phase != Phase::Disconnected;
            if has_identity != in_session {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!(
                        "client {}: phase {} with identity {:?}",
                        client.id, client.chat.phase, client.chat.local_identity
                    ),
                });
            }
        }
        Ok(())
    }
}

/// Nothing session-scoped survives a disconnect.
///
/// A Disconnected client shows no messages, no online users and no typing
/// peers.
pub struct TeardownCompleteness;

impl Invariant for TeardownCompleteness {
    fn name(&self) -> &'static str {
        "teardown_completeness"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for client in &state.clients {
            let chat = &client.chat;
            if chat.phase == Phase::Disconnected
                && (!chat.messages.is_empty() || !chat.presence.is_empty() || !chat.typing.is_empty())
            {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!(
                        "client {}: disconnected with {} messages, {} users, {} typing",
                        client.id,
                        chat.messages.len(),
                        chat.presence.len(),
                        chat.typing.len()
                    ),
                });
            }
        }
        Ok(())
    }
}

/// The local user never appears in their own typing line.
pub struct SelfNeverTyping;

impl Invariant for SelfNeverTyping {
    fn name(&self) -> &'static str {
        "self_never_typing"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for client in &state.clients {
            if let Some(local) = client.chat.local_identity.as_deref()
                && client.chat.typing.iter().any(|peer| peer == local)
            {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!("client {}: {local} listed as typing", client.id),
                });
            }
        }
        Ok(())
    }
}

/// Message ids are unique within a client's log.
pub struct UniqueMessageIds;

impl Invariant for UniqueMessageIds {
    fn name(&self) -> &'static str {
        "unique_message_ids"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for client in &state.clients {
            let mut seen = HashSet::new();
            for message in &client.chat.messages {
                if !seen.insert(message.id.as_str()) {
                    return Err(Violation {
                        invariant: self.name(),
                        message: format!("client {}: duplicate message id {}", client.id, message.id),
                    });
                }
            }
        }
        Ok(())
    }
}

/// No message lists its own sender as a reader.
pub struct ReadersExcludeSender;

impl Invariant for ReadersExcludeSender {
    fn name(&self) -> &'static str {
        "readers_exclude_sender"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for client in &state.clients {
            if let Some(message) =
                client.chat.messages.iter().find(|message| message.read_by.contains(&message.sender))
            {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!(
                        "client {}: message {} read by its sender {}",
                        client.id, message.id, message.sender
                    ),
                });
            }
        }
        Ok(())
    }
}
