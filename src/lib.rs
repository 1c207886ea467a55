//! # Shamir Secret Sharing over GF(2^m)
//!
//! This library implements a (k, n) threshold secret sharing scheme over the binary extension
//! fields GF(2^m), 2 <= m <= 8. A secret byte string is split into `n` shares such that any `k`
//! of them reconstruct it exactly, while `k - 1` or fewer reveal nothing about it other than its
//! length.
//!
//! ## Shamir's Secret Sharing (SSS)
//!
//! Shamir's Secret Sharing is a cryptographic algorithm created by Adi Shamir. A secret is
//! divided into parts, giving each participant its own unique part, with the property that a
//! certain number of these parts are needed to reconstruct the secret.
//!
//! ### The Mathematics Behind SSS
//!
//! For every symbol `S` of the secret the algorithm chooses a random polynomial of degree `k-1`
//! over the field:
//!
//! ```ignore
//! f(x) = a0 + a1*x + a2*x^2 + ... + a(k-1)*x^(k-1)
//! ```
//!
//! where `a0 = S` and `a1, ..., a(k-1)` are drawn from a cryptographically secure source. Share
//! `j` holds the point `(j, f(j))` of every such polynomial. With at least `k` points the
//! polynomial, and hence `S = f(0)`, is recovered with Lagrange interpolation. Because every
//! symbol gets its own independent polynomial, fewer than `k` points are consistent with every
//! possible secret.
//!
//! Field arithmetic uses discrete log/antilog tables generated from an allow-listed primitive
//! polynomial; the tables of one field are built once and can be shared between threads.
//!
//! ## Usage
//!
//! ### Example: Splitting and Recovering a Secret
//!
//! ```rust
//! use shamir::field::GaloisField;
//! use shamir::reconstruct::recover_secret;
//! use shamir::split::split_secret;
//!
//! let field = GaloisField::new(0x11d).unwrap();
//! let secret = split_secret(&field, b"hello world", 3, 5).unwrap();
//!
//! // any three shares will do
//! let shares = &secret.shares()[1..4];
//! assert_eq!(recover_secret(shares).unwrap(), b"hello world");
//! ```
//!
//! ### Example: Shares as Text
//!
//! ```rust
//! use shamir::codec::extract_shares;
//! use shamir::reconstruct::recover_secret;
//!
//! let text = "
//!     shamir-7SPFLJYT-11d-3-xYSJU5oTyQcNZHs9SvY
//!     shamir-7SPFLJYT-11d-4-fu7/+G46PVTx0GBOL5E
//! ";
//! let shares = extract_shares(text).unwrap();
//! assert_eq!(recover_secret(&shares).unwrap(), b"This is a test");
//! ```
//!
//! ## Limitations
//!
//! Shares carry no integrity protection. Recovering with fewer shares than the threshold the
//! secret was split with succeeds and returns bytes that are not the secret.

/// Conversion between secret bytes and m-bit field symbols.
pub mod bits;

/// Canonical text encoding of shares and extraction of shares from free text.
pub mod codec;

/// Command-line configuration loaded from TOML and the environment.
pub mod config;

/// The error type shared by every operation.
pub mod error;

/// GF(2^m) arithmetic through log/antilog tables, and a cache of built fields.
pub mod field;

/// The allow-list of primitive polynomials of degree 2 through 8.
pub mod polynomials;

/// Lagrange interpolation of a secret from a set of shares.
pub mod reconstruct;

/// The share value handed to participants.
pub mod share;

/// Splitting a secret into shares with fresh secure randomness.
pub mod split;

pub use error::{Result, ShamirError};
