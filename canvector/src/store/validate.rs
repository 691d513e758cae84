/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Id and payload validation.
//!
//! The payload layout is fixed-width: every byte is written as a four
//! character token (`0x` + two digits) and tokens are separated by one space,
//! so a payload of `n` bytes is `5n - 1` characters long.
//!
//! ```text
//! 0x01 0x02 0x03        len = 14, (14 + 1) % 5 == 0, 3 tokens
//! ```

use crate::frame::MAX_DATA_LEN;
use crate::frame::MAX_STANDARD_ID;

use super::error::ValidationError;

/// Radix marker every id and payload token must carry.
pub const HEX_MARKER: &str = "0x";

/// Characters one payload token occupies, including its separator.
const TOKEN_STRIDE: usize = 5;

/// Validate a message id and return its numeric value.
///
/// # Errors
/// See [`ValidationError`]'s `Id*` variants.
pub fn validate_id(id: &str) -> Result<u32, ValidationError> {
    if id.matches(HEX_MARKER).count() != 1 || id.len() <= HEX_MARKER.len() {
        return Err(ValidationError::IdNotHex { id: id.to_string() });
    }

    let digits = id
        .strip_prefix(HEX_MARKER)
        .filter(|d| d.chars().all(|c| c.is_ascii_hexdigit()))
        .ok_or_else(|| ValidationError::IdInvalidChars { id: id.to_string() })?;

    match u32::from_str_radix(digits, 16) {
        Ok(value) if value <= MAX_STANDARD_ID => Ok(value),
        _ => Err(ValidationError::IdOutOfRange { id: id.to_string() }),
    }
}

/// Validate a payload string and return its data bytes.
///
/// # Errors
/// [`ValidationError::PayloadFormat`] when the layout is wrong,
/// [`ValidationError::PayloadInvalidChars`] / [`ValidationError::ByteOutOfRange`]
/// for a bad token.
pub fn validate_payload(payload: &str) -> Result<Vec<u8>, ValidationError> {
    let char_len = payload.chars().count();
    let expected_tokens = (char_len + 1) / TOKEN_STRIDE;
    let spaces = payload.matches(' ').count();
    let markers = payload.matches(HEX_MARKER).count();

    let well_formed = (char_len + 1) % TOKEN_STRIDE == 0
        && expected_tokens >= 1
        && spaces == expected_tokens - 1
        && markers == expected_tokens
        && expected_tokens <= MAX_DATA_LEN;

    if !well_formed {
        return Err(ValidationError::PayloadFormat {
            payload: payload.to_string(),
        });
    }

    payload.split(' ').map(parse_byte).collect()
}

/// Validate both halves of a message.
pub fn validate_message(id: &str, payload: &str) -> Result<(u32, Vec<u8>), ValidationError> {
    let id = validate_id(id)?;
    let data = validate_payload(payload)?;
    Ok((id, data))
}

fn parse_byte(token: &str) -> Result<u8, ValidationError> {
    let digits = token
        .strip_prefix(HEX_MARKER)
        .filter(|d| !d.is_empty() && d.chars().all(|c| c.is_ascii_hexdigit()))
        .ok_or_else(|| ValidationError::PayloadInvalidChars {
            token: token.to_string(),
        })?;

    u8::from_str_radix(digits, 16).map_err(|_| ValidationError::ByteOutOfRange {
        token: token.to_string(),
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // ── validate_id ───────────────────────────────────────────────────────────

    #[test]
    fn plain_hex_id_is_accepted() {
        assert_eq!(validate_id("0x100"), Ok(0x100));
        assert_eq!(validate_id("0x7ff"), Ok(0x7FF));
        assert_eq!(validate_id("0x0"), Ok(0));
    }

    #[test]
    fn id_without_marker_is_rejected() {
        assert!(matches!(
            validate_id("100"),
            Err(ValidationError::IdNotHex { .. })
        ));
    }

    #[test]
    fn bare_marker_is_rejected() {
        assert!(matches!(
            validate_id("0x"),
            Err(ValidationError::IdNotHex { .. })
        ));
    }

    #[test]
    fn double_marker_is_rejected() {
        assert!(matches!(
            validate_id("0x0x1"),
            Err(ValidationError::IdNotHex { .. })
        ));
    }

    #[test]
    fn id_with_non_hex_digits_is_rejected() {
        for id in ["0x1G", "0x+1", "-0x10", "0x 1", "10x1"] {
            assert!(
                matches!(validate_id(id), Err(ValidationError::IdInvalidChars { .. })),
                "{id} should be rejected for its characters"
            );
        }
    }

    #[test]
    fn extended_range_id_is_rejected() {
        assert!(matches!(
            validate_id("0x800"),
            Err(ValidationError::IdOutOfRange { .. })
        ));
        assert!(matches!(
            validate_id("0x1FFFFFFFFF"),
            Err(ValidationError::IdOutOfRange { .. })
        ));
    }

    // ── validate_payload ──────────────────────────────────────────────────────

    #[test]
    fn eight_byte_payload_is_accepted() {
        let data = validate_payload("0x01 0x02 0x03 0x04 0x05 0x06 0x07 0x08").unwrap();
        assert_eq!(data, vec![1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn single_byte_payload_is_accepted() {
        assert_eq!(validate_payload("0xff"), Ok(vec![0xFF]));
    }

    #[test]
    fn empty_payload_is_rejected() {
        assert!(matches!(
            validate_payload(""),
            Err(ValidationError::PayloadFormat { .. })
        ));
    }

    #[test]
    fn nine_byte_payload_is_rejected() {
        let payload = vec!["0x00"; 9].join(" ");
        assert!(matches!(
            validate_payload(&payload),
            Err(ValidationError::PayloadFormat { .. })
        ));
    }

    #[test]
    fn double_space_is_rejected() {
        assert!(matches!(
            validate_payload("0x01  0x2"),
            Err(ValidationError::PayloadFormat { .. })
        ));
    }

    #[test]
    fn non_hex_token_is_rejected() {
        assert!(matches!(
            validate_payload("0x01 0xZZ"),
            Err(ValidationError::PayloadInvalidChars { .. })
        ));
    }

    #[test]
    fn token_above_one_byte_is_rejected() {
        // "0x1 0x123" still satisfies the length arithmetic.
        assert!(matches!(
            validate_payload("0x1 0x123"),
            Err(ValidationError::ByteOutOfRange { .. })
        ));
    }

    #[test]
    fn validate_message_checks_id_first() {
        assert!(matches!(
            validate_message("bad", "bad"),
            Err(ValidationError::IdNotHex { .. })
        ));
    }

    // ── Properties ────────────────────────────────────────────────────────────

    fn payload_text(bytes: &[u8]) -> String {
        bytes
            .iter()
            .map(|b| format!("0x{b:02X}"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    proptest! {
        #[test]
        fn well_formed_payload_round_trips(bytes in proptest::collection::vec(any::<u8>(), 1..=8)) {
            let text = payload_text(&bytes);
            prop_assert_eq!(validate_payload(&text), Ok(bytes));
        }

        #[test]
        fn standard_ids_are_accepted(id in 0u32..=0x7FF) {
            prop_assert_eq!(validate_id(&format!("0x{id:x}")), Ok(id));
        }

        #[test]
        fn payload_with_wrong_length_is_rejected(bytes in proptest::collection::vec(any::<u8>(), 1..=8), pad in 1usize..5) {
            let text = format!("{}{}", payload_text(&bytes), "0".repeat(pad));
            prop_assert!(validate_payload(&text).is_err());
        }

        #[test]
        fn too_many_tokens_are_rejected(bytes in proptest::collection::vec(any::<u8>(), 9..16)) {
            prop_assert!(matches!(
                validate_payload(&payload_text(&bytes)),
                Err(ValidationError::PayloadFormat { .. })
            ), "expected PayloadFormat error");
        }
    }
}
