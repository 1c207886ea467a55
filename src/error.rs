/// Errors produced while building fields, splitting secrets, or recovering them.
///
/// Variants identify the offending input (polynomial, share position, x value, secret id) but
/// never carry secret bytes or share y-values.
#[derive(Debug, thiserror::Error)]
pub enum ShamirError {
    /// The polynomial cannot generate a supported field.
    #[error("0x{polynomial:x} is not a usable primitive polynomial: {reason}")]
    InvalidPrimitivePolynomial { polynomial: u32, reason: String },

    /// More shares are required for reconstruction than will be produced.
    #[error("threshold {threshold} exceeds the number of shares {shares}")]
    ThresholdExceedsShares { threshold: usize, shares: usize },

    /// The threshold is below the minimum of two.
    #[error("threshold must be at least 2, got {0}")]
    InvalidThreshold(usize),

    /// The share count does not fit the field (2 <= n <= 2^m - 1).
    #[error("share count must be between 2 and {max}, got {shares}")]
    InvalidShareCount { shares: usize, max: usize },

    /// The secure random source could not be read.
    #[error("secure random source failed after {attempts} attempt(s): {source}")]
    RandomSourceFailure {
        attempts: u32,
        #[source]
        source: rand::Error,
    },

    /// Shares belong to different secrets.
    #[error("share {index} belongs to secret {found}, expected {expected}")]
    MismatchedSecretId {
        index: usize,
        expected: String,
        found: String,
    },

    /// Shares carry the same secret id but different primitive polynomials.
    #[error("share {index} uses polynomial 0x{found:x}, expected 0x{expected:x}")]
    MismatchedPolynomial {
        index: usize,
        expected: u32,
        found: u32,
    },

    /// Two shares carry the same x-coordinate.
    #[error("share {index} duplicates x-coordinate {x}")]
    DuplicateShare { index: usize, x: u8 },

    /// A share is structurally unusable (length mismatch, out-of-field value).
    #[error("share {index} is malformed: {reason}")]
    MalformedShare { index: usize, reason: String },

    /// Reconstruction needs at least two shares.
    #[error("at least 2 shares are required, got {0}")]
    InsufficientShares(usize),

    /// Bulk recovery was asked to work on nothing.
    #[error("no shares to recover")]
    EmptyShareSet,

    /// Text matched the share grammar but one of its fields did not decode.
    #[error("could not parse share `{label}`: {reason}")]
    ShareParseError { label: String, reason: String },

    /// Division by the zero element of the field.
    #[error("division by zero in GF(2^m)")]
    DivisionByZero,
}

pub type Result<T> = std::result::Result<T, ShamirError>;
