//! Allow-list of primitive polynomials over GF(2).
//!
//! [`GaloisField`](crate::field::GaloisField) does not check primitivity: a reducible or
//! non-primitive polynomial silently produces tables that are not a cyclic group. Anything that
//! comes from a user (command line, configuration, parsed shares) is checked here first.

use crate::error::{Result, ShamirError};

/// Smallest supported field degree.
pub const MIN_DEGREE: u32 = 2;

/// Largest supported field degree. Every element of GF(2^8) still fits in a byte.
pub const MAX_DEGREE: u32 = 8;

/// The polynomial used when none is given: x^8 + x^4 + x^3 + x^2 + 1.
pub const DEFAULT_POLYNOMIAL: u32 = 0x11d;

/// Every primitive polynomial of degree 2 through 8, grouped by degree.
pub const PRIMITIVE_POLYNOMIALS: &[u32] = &[
    // degree 2
    0x7,
    // degree 3
    0xb, 0xd,
    // degree 4
    0x13, 0x19,
    // degree 5
    0x25, 0x29, 0x2f, 0x37, 0x3b, 0x3d,
    // degree 6
    0x43, 0x5b, 0x61, 0x67, 0x6d, 0x73,
    // degree 7
    0x83, 0x89, 0x8f, 0x91, 0x9d, 0xa7, 0xab, 0xb9, 0xbf, 0xc1, 0xcb, 0xd3, 0xd5, 0xe5, 0xef,
    0xf1, 0xf7, 0xfd,
    // degree 8
    0x11d, 0x12b, 0x12d, 0x14d, 0x15f, 0x163, 0x165, 0x169, 0x171, 0x187, 0x18d, 0x1a9, 0x1c3,
    0x1cf, 0x1e7, 0x1f5,
];

/// Degree of a polynomial given as a bitmask, i.e. the index of its highest set bit.
///
/// `degree(0)` and `degree(1)` are both 0.
pub fn degree(polynomial: u32) -> u32 {
    if polynomial == 0 {
        0
    } else {
        31 - polynomial.leading_zeros()
    }
}

pub fn is_allowed(polynomial: u32) -> bool {
    PRIMITIVE_POLYNOMIALS.contains(&polynomial)
}

/// The allow-listed polynomials of degree `m`, empty for unsupported degrees.
pub fn for_degree(m: u32) -> Vec<u32> {
    PRIMITIVE_POLYNOMIALS
        .iter()
        .copied()
        .filter(|&p| degree(p) == m)
        .collect()
}

/// Rejects any polynomial that is not on the allow-list.
pub fn validate(polynomial: u32) -> Result<u32> {
    if is_allowed(polynomial) {
        return Ok(polynomial);
    }

    let m = degree(polynomial);
    let reason = if (MIN_DEGREE..=MAX_DEGREE).contains(&m) {
        let choices: Vec<String> = for_degree(m).iter().map(|p| format!("0x{p:x}")).collect();
        format!(
            "not a primitive polynomial of degree {m}, choose one of: {}",
            choices.join(", ")
        )
    } else {
        format!("degree {m} is outside the supported range {MIN_DEGREE}..={MAX_DEGREE}")
    };

    Err(ShamirError::InvalidPrimitivePolynomial { polynomial, reason })
}

/// Parses `0x`-prefixed hexadecimal or plain decimal input, as accepted on the command line.
pub fn parse(input: &str) -> std::result::Result<u32, String> {
    let trimmed = input.trim();
    let parsed = match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => trimmed.parse::<u32>(),
    };
    parsed.map_err(|err| format!("`{input}` is not a polynomial: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degree() {
        assert_eq!(degree(0x11d), 8);
        assert_eq!(degree(0x7), 2);
        assert_eq!(degree(1), 0);
        assert_eq!(degree(0), 0);
    }

    #[test]
    fn test_counts_per_degree() {
        // phi(2^m - 1) / m primitive polynomials exist for each degree
        let expected = [(2, 1), (3, 2), (4, 2), (5, 6), (6, 6), (7, 18), (8, 16)];
        for (m, count) in expected {
            assert_eq!(for_degree(m).len(), count, "degree {m}");
        }
        assert!(for_degree(9).is_empty());
    }

    #[test]
    fn test_validate() {
        assert_eq!(validate(0x11d).unwrap(), 0x11d);
        assert!(validate(0x11b).is_err());
        assert!(validate(0x3).is_err());
        assert!(matches!(
            validate(0x211),
            Err(ShamirError::InvalidPrimitivePolynomial { polynomial: 0x211, .. })
        ));
    }

    #[test]
    fn test_parse() {
        assert_eq!(parse("0x11d"), Ok(0x11d));
        assert_eq!(parse("0X12B"), Ok(0x12b));
        assert_eq!(parse("285"), Ok(285));
        assert!(parse("0xzz").is_err());
        assert!(parse("").is_err());
    }
}
