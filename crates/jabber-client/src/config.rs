//! Client configuration.

use std::time::Duration;

/// Quiet period after the last input change before `TYPING:false` is sent.
pub const DEFAULT_TYPING_DEBOUNCE: Duration = Duration::from_millis(3000);

/// Client configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientConfig {
    /// Trailing debounce for the local typing signal
    pub typing_debounce: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self { typing_debounce: DEFAULT_TYPING_DEBOUNCE }
    }
}
