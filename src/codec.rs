//! Canonical text form of a share.
//!
//! A share is written on one line as
//!
//! ```text
//! shamir-{secret id}-{polynomial, lowercase hex}-{x, decimal}-{y bytes, unpadded base64}
//! ```
//!
//! and can be pulled back out of arbitrary surrounding text: pasted documents, files holding
//! several shares, command-line arguments. The grammar is fixed (literal tag, `-` delimiters,
//! field order, standard base64 alphabet without padding). The payload runs to the next whitespace
//! or the end of the text, and the tag may follow any character. Once the grammar matches, a field
//! that does not decode is an error rather than a reason to skip the match or shorten the payload.

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine};
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use tracing::debug;

use crate::error::{Result, ShamirError};
use crate::share::Share;

/// Literal tag that starts every encoded share.
pub const SHARE_TAG: &str = "shamir";

lazy_static! {
    static ref SHARE_PATTERN: Regex = Regex::new(
        r"shamir-([A-Za-z0-9]+)-([A-Za-z0-9]+)-([A-Za-z0-9]+)-(\S*)"
    )
    .expect("share pattern compiles");
}

/// `{tag}-{secret_id}-{polynomial hex}-{x}`.
pub fn label(share: &Share) -> String {
    format!(
        "{}-{}-{:x}-{}",
        SHARE_TAG,
        share.secret_id(),
        share.primitive_polynomial(),
        share.x()
    )
}

/// Encodes a share as its canonical one-line form.
///
/// # Examples
///
/// ```rust
/// use shamir::codec;
/// use shamir::share::Share;
///
/// let share = Share::new("ABC", 0x11d, 1, vec![0, 1, 2]);
/// assert_eq!(codec::encode(&share), "shamir-ABC-11d-1-AAEC");
/// ```
pub fn encode(share: &Share) -> String {
    format!("{}-{}", label(share), STANDARD_NO_PAD.encode(share.y()))
}

/// Decodes text that consists of exactly one encoded share, ignoring surrounding whitespace.
pub fn decode(text: &str) -> Result<Share> {
    let trimmed = text.trim();
    match SHARE_PATTERN.captures(trimmed) {
        Some(captures) if captures.get(0).map(|m| m.as_str()) == Some(trimmed) => {
            share_from_captures(&captures)
        }
        _ => Err(ShamirError::ShareParseError {
            label: trimmed.chars().take(64).collect(),
            reason: "text is not a single encoded share".to_string(),
        }),
    }
}

/// Extracts every share embedded in `text`, in order of first occurrence.
///
/// Text that does not match the grammar is ignored. A match whose polynomial, x-coordinate, or
/// base64 payload does not decode fails the whole extraction.
///
/// # Examples
///
/// ```rust
/// use shamir::codec::extract_shares;
///
/// let text = "keep these safe:\nshamir-ABC-11d-1-AAEC\nnotes\nshamir-ABC-11d-2-AwQF\n";
/// let shares = extract_shares(text).unwrap();
/// assert_eq!(shares.len(), 2);
/// assert_eq!(shares[1].x(), 2);
/// ```
pub fn extract_shares(text: &str) -> Result<Vec<Share>> {
    let shares = SHARE_PATTERN
        .captures_iter(text)
        .map(|captures| share_from_captures(&captures))
        .collect::<Result<Vec<_>>>()?;

    debug!("extracted {} share(s) from {} bytes of text", shares.len(), text.len());
    Ok(shares)
}

fn share_from_captures(captures: &Captures<'_>) -> Result<Share> {
    let secret_id = &captures[1];
    let polynomial_field = &captures[2];
    let x_field = &captures[3];
    let y_field = &captures[4];

    let parse_error = |reason: String| ShamirError::ShareParseError {
        label: format!("{SHARE_TAG}-{secret_id}-{polynomial_field}-{x_field}"),
        reason,
    };

    let primitive_polynomial = u32::from_str_radix(polynomial_field, 16)
        .map_err(|err| parse_error(format!("polynomial `{polynomial_field}` is not hex: {err}")))?;

    let x = x_field
        .parse::<u8>()
        .map_err(|err| parse_error(format!("x-coordinate `{x_field}` is not a byte: {err}")))?;
    if x == 0 {
        return Err(parse_error("x-coordinate must be nonzero".to_string()));
    }

    let y = STANDARD_NO_PAD
        .decode(y_field)
        .map_err(|err| parse_error(format!("invalid base64 payload: {err}")))?;

    Ok(Share::new(secret_id, primitive_polynomial, x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode() {
        let share = Share::new("7SPFLJYT", 0x11d, 4, b"fu".to_vec());
        assert_eq!(encode(&share), "shamir-7SPFLJYT-11d-4-ZnU");
    }

    #[test]
    fn test_decode_round_trip() {
        let share = Share::new("0A1B2C3D4E", 0x1f5, 255, (0..=255).collect());
        assert_eq!(decode(&encode(&share)).unwrap(), share);
    }

    #[test]
    fn test_decode_empty_payload() {
        let share = Share::new("ID", 0x7, 1, vec![]);
        assert_eq!(encode(&share), "shamir-ID-7-1-");
        assert_eq!(decode("shamir-ID-7-1-").unwrap(), share);
    }

    #[test]
    fn test_decode_rejects_extra_text() {
        assert!(decode("hello shamir-ID-11d-1-AAEC").is_err());
        assert!(decode("nothing here").is_err());
        assert!(decode("  shamir-ID-11d-1-AAEC\n").is_ok());
    }

    #[test]
    fn test_extract_preserves_order() {
        let text = "shamir-B-11d-2-AQ\n# comment\nprefix shamir-A-11d-1-Ag suffix\nshamir-B-11d-3-Aw";
        let shares = extract_shares(text).unwrap();
        let ids: Vec<(&str, u8)> = shares.iter().map(|s| (s.secret_id(), s.x())).collect();
        assert_eq!(ids, vec![("B", 2), ("A", 1), ("B", 3)]);
    }

    #[test]
    fn test_extract_nothing() {
        assert!(extract_shares("").unwrap().is_empty());
        assert!(extract_shares("no shares, just shamir and text").unwrap().is_empty());
    }

    #[test]
    fn test_extract_share_glued_to_word() {
        let shares = extract_shares("file_shamir-ABC-11d-1-AQ").unwrap();
        assert_eq!(shares, vec![Share::new("ABC", 0x11d, 1, vec![1])]);
    }

    #[test]
    fn test_bad_polynomial() {
        let err = extract_shares("shamir-A-zz-1-AQ").unwrap_err();
        assert!(matches!(err, ShamirError::ShareParseError { .. }));
    }

    #[test]
    fn test_bad_x() {
        for text in ["shamir-A-11d-300-AQ", "shamir-A-11d-x1-AQ", "shamir-A-11d-0-AQ"] {
            assert!(
                matches!(extract_shares(text), Err(ShamirError::ShareParseError { .. })),
                "{text}"
            );
        }
    }

    #[test]
    fn test_bad_base64() {
        // a single trailing symbol cannot encode a whole byte
        let err = extract_shares("shamir-A-11d-1-AAECA").unwrap_err();
        match err {
            ShamirError::ShareParseError { label, .. } => assert_eq!(label, "shamir-A-11d-1"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_corrupt_character_in_payload() {
        for text in ["shamir-ABC-11d-1-ChQe!DI8", "before shamir-ABC-11d-1-ChQe!DI8 after"] {
            match extract_shares(text) {
                Err(ShamirError::ShareParseError { label, .. }) => {
                    assert_eq!(label, "shamir-ABC-11d-1")
                }
                other => panic!("unexpected result {other:?}"),
            }
        }
        assert!(decode("shamir-ABC-11d-1-ChQe!DI8").is_err());
    }

    #[test]
    fn test_padded_payload() {
        assert!(matches!(
            extract_shares("shamir-ABC-11d-1-AQ=="),
            Err(ShamirError::ShareParseError { .. })
        ));
        assert!(matches!(
            extract_shares("shamir-ABC-11d-1-AQE="),
            Err(ShamirError::ShareParseError { .. })
        ));
        assert_eq!(extract_shares("shamir-ABC-11d-1-AQ").unwrap()[0].y(), &[1]);
    }
}
