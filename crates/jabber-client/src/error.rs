//! Client error types.

use jabber_core::ConnectionError;
use thiserror::Error;

/// Errors surfaced by [`crate::Client::handle`].
///
/// Malformed frames, duplicates, and unknown ids are absorbed inside the
/// client and never show up here. These errors describe requests the caller
/// made at the wrong time.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Operation needs a confirmed session
    #[error("not connected")]
    NotConnected,

    /// Session lifecycle rejected the request
    #[error(transparent)]
    Connection(#[from] ConnectionError),
}
