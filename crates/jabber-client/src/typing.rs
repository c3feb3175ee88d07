//! Typing indicator.
//!
//! Two halves: [`TypingDebounce`] turns local keystrokes into a trailing
//! `TYPING:false` once input goes quiet, and [`TypingIndicator`] aggregates
//! the typing signals of remote peers.

use std::{ops::Sub, time::Duration};

/// Single-slot trailing debounce for the local typing signal.
///
/// The timer is a stored arm time rather than a scheduled callback. It fires
/// on the first [`Self::poll`] at or past `armed_at + debounce`, and a
/// cancelled slot can never fire.
#[derive(Debug, Clone)]
pub struct TypingDebounce<I> {
    debounce: Duration,
    armed_at: Option<I>,
}

impl<I> TypingDebounce<I>
where
    I: Copy + Ord + Sub<Output = Duration>,
{
    /// Create an idle debounce with the given quiet period.
    pub fn new(debounce: Duration) -> Self {
        Self { debounce, armed_at: None }
    }

    /// (Re)arm the timer at `now`, replacing any pending deadline.
    pub fn arm(&mut self, now: I) {
        self.armed_at = Some(now);
    }

    /// Fire if the quiet period has elapsed.
    ///
    /// Returns `true` exactly once per arming; the slot is cleared on fire.
    pub fn poll(&mut self, now: I) -> bool {
        match self.armed_at {
            Some(armed_at) if now >= armed_at && now - armed_at >= self.debounce => {
                self.armed_at = None;
                true
            },
            _ => false,
        }
    }

    /// Cancel the pending timer. Returns `true` if one was armed.
    pub fn cancel(&mut self) -> bool {
        self.armed_at.take().is_some()
    }

    /// True while a deadline is pending.
    pub fn is_armed(&self) -> bool {
        self.armed_at.is_some()
    }
}

/// Set of remote peers currently typing, in the order they started.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypingIndicator {
    peers: Vec<String>,
}

impl TypingIndicator {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a typing signal from `identity`.
    ///
    /// Returns `true` if the set changed.
    pub fn set(&mut self, identity: &str, active: bool) -> bool {
        let position = self.peers.iter().position(|peer| peer == identity);
        match (active, position) {
            (true, None) => {
                self.peers.push(identity.to_string());
                true
            },
            (false, Some(index)) => {
                self.peers.remove(index);
                true
            },
            _ => false,
        }
    }

    /// Drop `identity` from the set. Returns `true` if it was present.
    pub fn remove(&mut self, identity: &str) -> bool {
        self.set(identity, false)
    }

    /// Peers currently typing.
    pub fn peers(&self) -> &[String] {
        &self.peers
    }

    /// True if `identity` is typing.
    pub fn contains(&self, identity: &str) -> bool {
        self.peers.iter().any(|peer| peer == identity)
    }

    /// True if nobody is typing.
    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    /// Empty the set.
    pub fn clear(&mut self) {
        self.peers.clear();
    }

    /// Status line for the current set, `None` when nobody is typing.
    pub fn describe(&self) -> Option<String> {
        describe(&self.peers)
    }
}

/// `"alice is typing..."` / `"alice, bob are typing..."`.
pub(crate) fn describe(peers: &[String]) -> Option<String> {
    match peers {
        [] => None,
        [single] => Some(format!("{single} is typing...")),
        many => Some(format!("{} are typing...", many.join(", "))),
    }
}
