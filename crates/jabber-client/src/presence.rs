//! Online user list.

/// Server-asserted list of online identities.
///
/// Replaced wholesale on every `USERS` frame; never patched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Presence {
    users: Vec<String>,
}

impl Presence {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the list, keeping server order.
    ///
    /// Returns `true` if the list changed.
    pub fn replace(&mut self, users: Vec<String>) -> bool {
        if self.users == users {
            return false;
        }
        self.users = users;
        true
    }

    /// Online identities in server order.
    pub fn users(&self) -> &[String] {
        &self.users
    }

    /// True if `identity` is online.
    pub fn contains(&self, identity: &str) -> bool {
        self.users.iter().any(|user| user == identity)
    }

    /// True if nobody is online.
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Empty the list.
    pub fn clear(&mut self) {
        self.users.clear();
    }
}
