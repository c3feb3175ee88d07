//! Codec error types.
//!
//! Every decode failure maps to exactly one [`ProtocolError`] variant. Callers
//! treat all of them the same way (log and drop the frame), but the variant is
//! kept so logs say why a frame was rejected.

use thiserror::Error;

use crate::FrameKind;

/// Result type for codec operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Reasons a text frame fails to decode.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Frame has no `:` between type and payload.
    #[error("missing ':' between frame type and payload")]
    MissingDelimiter,

    /// Frame type is not recognized in this direction.
    #[error("unknown frame type {0:?}")]
    UnknownKind(String),

    /// Payload has fewer fields than the frame type requires.
    #[error("{kind} payload is missing field `{field}`")]
    MissingField {
        /// Frame type being decoded
        kind: FrameKind,
        /// Name of the absent field
        field: &'static str,
    },

    /// A required field is present but empty.
    #[error("{kind} payload has empty field `{field}`")]
    EmptyField {
        /// Frame type being decoded
        kind: FrameKind,
        /// Name of the empty field
        field: &'static str,
    },

    /// Strict boolean field holds something other than `true` or `false`.
    #[error("invalid boolean {0:?}")]
    InvalidBool(String),
}
