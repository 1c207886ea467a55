//! Conversion between byte-oriented secrets and m-bit field symbols.
//!
//! A secret is read as one MSB-first bit stream and cut into `m`-bit symbols, the last symbol
//! zero-padded on the right. Packing reverses this and drops the pad bits. For `m = 8` both
//! directions are the identity.

use crate::field::Element;

/// Number of `m`-bit symbols needed to carry `len` bytes.
pub fn symbol_count(len: usize, m: u32) -> usize {
    (len * 8).div_ceil(m as usize)
}

/// Number of whole bytes carried by `count` symbols of `m` bits.
pub fn byte_count(count: usize, m: u32) -> usize {
    count * m as usize / 8
}

/// Splits `bytes` into `m`-bit symbols, `1 <= m <= 8`.
pub fn unpack(bytes: &[u8], m: u32) -> Vec<Element> {
    debug_assert!((1..=8).contains(&m));
    if m == 8 {
        return bytes.to_vec();
    }

    let mask = (1u32 << m) - 1;
    let mut symbols = Vec::with_capacity(symbol_count(bytes.len(), m));
    let mut buffer: u32 = 0;
    let mut bits: u32 = 0;

    for &byte in bytes {
        buffer = (buffer << 8) | byte as u32;
        bits += 8;
        while bits >= m {
            bits -= m;
            symbols.push(((buffer >> bits) & mask) as Element);
        }
        buffer &= (1 << bits) - 1;
    }

    if bits > 0 {
        symbols.push(((buffer << (m - bits)) & mask) as Element);
    }

    symbols
}

/// Joins `m`-bit symbols back into bytes, discarding trailing pad bits.
///
/// Bits of a symbol above `m` are ignored.
pub fn pack(symbols: &[Element], m: u32) -> Vec<u8> {
    debug_assert!((1..=8).contains(&m));
    if m == 8 {
        return symbols.to_vec();
    }

    let mask = (1u32 << m) - 1;
    let mut bytes = Vec::with_capacity(byte_count(symbols.len(), m));
    let mut buffer: u32 = 0;
    let mut bits: u32 = 0;

    for &symbol in symbols {
        buffer = (buffer << m) | (symbol as u32 & mask);
        bits += m;
        if bits >= 8 {
            bits -= 8;
            bytes.push((buffer >> bits) as u8);
            buffer &= (1 << bits) - 1;
        }
    }

    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_for_bytes() {
        let data = b"identity".to_vec();
        assert_eq!(unpack(&data, 8), data);
        assert_eq!(pack(&data, 8), data);
    }

    #[test]
    fn test_nibbles() {
        assert_eq!(unpack(&[0xab, 0x12], 4), vec![0xa, 0xb, 0x1, 0x2]);
        assert_eq!(pack(&[0xa, 0xb, 0x1, 0x2], 4), vec![0xab, 0x12]);
    }

    #[test]
    fn test_padding_of_last_symbol() {
        // 0b10110011 -> 101 100 11(0)
        assert_eq!(unpack(&[0b1011_0011], 3), vec![0b101, 0b100, 0b110]);
        assert_eq!(pack(&[0b101, 0b100, 0b110], 3), vec![0b1011_0011]);
    }

    #[test]
    fn test_round_trip_all_degrees() {
        let data: Vec<u8> = (0..=255u8).rev().chain(0..37).collect();
        for m in 1..=8 {
            let symbols = unpack(&data, m);
            assert_eq!(symbols.len(), symbol_count(data.len(), m));
            assert!(symbols.iter().all(|&s| (s as u32) < (1 << m)));
            assert_eq!(pack(&symbols, m), data, "m = {m}");
        }
    }

    #[test]
    fn test_empty() {
        assert!(unpack(&[], 5).is_empty());
        assert!(pack(&[], 5).is_empty());
    }
}
