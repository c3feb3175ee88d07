//! Jabber wire protocol.
//!
//! Pure encode/decode between typed events and the text frames exchanged over
//! the transport. No I/O, no state.
//!
//! # Grammar
//!
//! Every frame is a single UTF-8 text message `TYPE:PAYLOAD`, split on the
//! first colon only. Payloads of compound frames use `::` between fields, `,`
//! between list entries and `\n` between history records:
//!
//! ```text
//! client -> server                  server -> client
//! CONNECT:<identity>                CONNECTED:<identity>
//! DISCONNECT:<identity>             NEW_MESSAGE:<id>::<sender>::<timestamp>::<text>
//! MESSAGE:<text>                    READ_UPDATE:<id>::<reader>,<reader>,...
//! TYPING:true|false                 USERS:<identity>,<identity>,...
//! READ:<id>                         TYPING:<identity>,true|false
//!                                   MESSAGES:<record>\n<record>\n...
//! ```
//!
//! # Constraints
//!
//! Encoding never fails. Field contents are not escaped, so callers must keep
//! identities free of `,` and `::`, ids free of `::`, and history text free of
//! newlines if they are to round-trip. These constraints are part of the
//! protocol and are not checked at runtime.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod client;
pub mod errors;
mod frame;
mod kind;
mod server;

pub use client::ClientFrame;
pub use errors::ProtocolError;
pub use frame::{FIELD_SEPARATOR, KIND_SEPARATOR, LIST_SEPARATOR, RECORD_SEPARATOR, RawFrame};
pub use kind::FrameKind;
pub use server::{MessageRecord, SYSTEM_SENDER, ServerFrame};
