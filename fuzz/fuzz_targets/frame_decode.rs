//! Fuzz target for ServerFrame::decode
//!
//! Feeds arbitrary text to the inbound decoder to find:
//! - Parser panics on odd delimiter placement
//! - Slicing inside multi-byte characters
//! - History payloads that escape the per-line skip logic
//!
//! The fuzzer should NEVER panic. Invalid input must come back as `Err`.

#![no_main]

use jabber_proto::{ClientFrame, ServerFrame};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);

    if let Ok(frame) = ServerFrame::decode(&text) {
        // Anything that decodes must encode and decode again.
        let again = ServerFrame::decode(&frame.encode());
        assert!(again.is_ok(), "re-decode failed for {frame:?}");
    }

    let _ = ClientFrame::decode(&text);
});
