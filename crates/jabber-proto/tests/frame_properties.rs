//! Property-based tests for frame decoding.
//!
//! The decoder faces arbitrary server input, so these tests check properties
//! over ALL inputs rather than specific examples: decoding is total, compound
//! payloads reassemble correctly, and list payloads never carry blank entries.

use jabber_proto::{ClientFrame, MessageRecord, ProtocolError, ServerFrame};
use proptest::prelude::*;

/// Identities and ids: no separators, never empty.
fn token() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_]{1,12}"
}

/// Display timestamps in the `HH:MM` shape the server emits.
fn timestamp() -> impl Strategy<Value = String> {
    "[0-2][0-9]:[0-5][0-9]"
}

/// Arbitrary text that leans on separators.
fn tricky_text() -> impl Strategy<Value = String> {
    prop_oneof![
        any::<String>(),
        "[a-z :,]{0,40}",
        prop::collection::vec(prop_oneof![Just("::"), Just(":"), Just(","), Just("x")], 0..16)
            .prop_map(|parts| parts.concat()),
    ]
}

proptest! {
    #[test]
    fn decode_is_total(text in any::<String>()) {
        // Must never panic; either outcome is acceptable
        let _ = ServerFrame::decode(&text);
        let _ = ClientFrame::decode(&text);
    }

    #[test]
    fn decode_with_known_prefix_is_total(
        kind in prop::sample::select(vec![
            "CONNECTED", "NEW_MESSAGE", "READ_UPDATE", "USERS", "TYPING", "MESSAGES",
        ]),
        payload in tricky_text(),
    ) {
        let _ = ServerFrame::decode(&format!("{kind}:{payload}"));
    }

    #[test]
    fn new_message_text_survives_separators(
        id in token(),
        sender in token(),
        ts in timestamp(),
        text in tricky_text(),
    ) {
        let wire = format!("NEW_MESSAGE:{id}::{sender}::{ts}::{text}");
        let decoded = ServerFrame::decode(&wire);

        prop_assert_eq!(
            decoded,
            Ok(ServerFrame::NewMessage(MessageRecord::new(id, sender, ts, text)))
        );
    }

    #[test]
    fn users_never_contains_blank_entries(payload in "[a-z ,]{0,40}") {
        let Ok(ServerFrame::Users(users)) = ServerFrame::decode(&format!("USERS:{payload}")) else {
            return Err(TestCaseError::fail("USERS must always decode"));
        };

        prop_assert!(users.iter().all(|user| !user.trim().is_empty()));

        let expected: Vec<&str> =
            payload.split(',').filter(|entry| !entry.trim().is_empty()).collect();
        prop_assert_eq!(users, expected);
    }

    #[test]
    fn typing_is_active_only_for_literal_true(identity in token(), state in "[a-zA-Z]{0,6}") {
        let decoded = ServerFrame::decode(&format!("TYPING:{identity},{state}"));

        prop_assert_eq!(decoded, Ok(ServerFrame::Typing { identity, active: state == "true" }));
    }

    #[test]
    fn frames_without_colon_are_rejected(text in "[A-Z_a-z0-9 ,]{0,30}") {
        prop_assert_eq!(ServerFrame::decode(&text), Err(ProtocolError::MissingDelimiter));
    }

    #[test]
    fn history_keeps_well_formed_records(
        records in prop::collection::vec((token(), token(), timestamp(), "[a-z :]{0,20}"), 0..8),
    ) {
        let records: Vec<MessageRecord> = records
            .into_iter()
            .map(|(id, sender, ts, text)| MessageRecord::new(id, sender, ts, text))
            .collect();

        let wire = ServerFrame::History { records: records.clone(), skipped: 0 }.encode();

        prop_assert_eq!(
            ServerFrame::decode(&wire),
            Ok(ServerFrame::History { records, skipped: 0 })
        );
    }
}
