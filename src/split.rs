use core::fmt;

use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use tracing::{debug, info, warn};

use crate::bits;
use crate::error::{Result, ShamirError};
use crate::field::{Element, GaloisField};
use crate::share::Share;

/// Attempts at the secure random source before giving up.
pub const DEFAULT_RANDOM_ATTEMPTS: u32 = 3;

/// Bytes of randomness behind a secret id.
const SECRET_ID_BYTES: usize = 5;

/// A cryptographically secure random source with a bounded retry policy.
///
/// Every coefficient that masks the secret comes from here. A failed read is retried up to
/// `attempts` times and then reported as [`ShamirError::RandomSourceFailure`].
#[derive(Debug)]
pub struct RandomSource<R> {
    rng: R,
    attempts: u32,
}

impl RandomSource<OsRng> {
    /// The operating system CSPRNG.
    pub fn os(attempts: u32) -> Self {
        RandomSource::new(OsRng, attempts)
    }
}

impl Default for RandomSource<OsRng> {
    fn default() -> Self {
        RandomSource::os(DEFAULT_RANDOM_ATTEMPTS)
    }
}

impl<R: RngCore + CryptoRng> RandomSource<R> {
    pub fn new(rng: R, attempts: u32) -> Self {
        RandomSource {
            rng,
            attempts: attempts.max(1),
        }
    }

    /// Fills `dest` with random bytes.
    pub fn fill(&mut self, dest: &mut [u8]) -> Result<()> {
        let mut attempt = 1;
        loop {
            match self.rng.try_fill_bytes(dest) {
                Ok(()) => return Ok(()),
                Err(source) if attempt >= self.attempts => {
                    return Err(ShamirError::RandomSourceFailure {
                        attempts: attempt,
                        source,
                    });
                }
                Err(err) => {
                    warn!("random source failed (attempt {}/{}): {}", attempt, self.attempts, err);
                    attempt += 1;
                }
            }
        }
    }
}

/// A freshly split secret: its id, the field it was split over, and the shares to hand out.
///
/// The secret itself is not kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Secret {
    id: String,
    primitive_polynomial: u32,
    threshold: usize,
    shares: Vec<Share>,
}

impl Secret {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn primitive_polynomial(&self) -> u32 {
        self.primitive_polynomial
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn shares(&self) -> &[Share] {
        &self.shares
    }

    pub fn into_shares(self) -> Vec<Share> {
        self.shares
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Secret {}", self.id)?;
        write!(f, "Shares:")?;
        for share in &self.shares {
            write!(f, "\n  {share}")?;
        }
        Ok(())
    }
}

/// Splits a secret into `nshares` shares, any `threshold` of which recover it.
///
/// Uses the operating system CSPRNG. See [`split_secret_with`].
///
/// # Examples
///
/// ```rust
/// use shamir::field::GaloisField;
/// use shamir::split::split_secret;
///
/// let field = GaloisField::new(0x11d).unwrap();
/// let secret = split_secret(&field, b"hello world", 3, 5).unwrap();
/// assert_eq!(secret.shares().len(), 5);
/// ```
pub fn split_secret(
    field: &GaloisField,
    secret: &[u8],
    threshold: usize,
    nshares: usize,
) -> Result<Secret> {
    split_secret_with(field, secret, threshold, nshares, &mut RandomSource::default())
}

/// Splits a secret using the given random source.
///
/// For every symbol of the secret a polynomial of degree `threshold - 1` is drawn with the symbol
/// as its constant term and uniformly random higher coefficients; share `j` receives its value at
/// `x = j + 1`. Symbols are bytes for GF(2^8) and `m`-bit chunks of the secret otherwise.
///
/// # Errors
///
/// * [`ShamirError::InvalidThreshold`] if `threshold < 2`.
/// * [`ShamirError::ThresholdExceedsShares`] if `threshold > nshares`.
/// * [`ShamirError::InvalidShareCount`] if `nshares` is not in `2..=2^m - 1`.
/// * [`ShamirError::RandomSourceFailure`] if randomness cannot be read.
///
/// Validation and all random reads happen before any share is computed.
pub fn split_secret_with<R: RngCore + CryptoRng>(
    field: &GaloisField,
    secret: &[u8],
    threshold: usize,
    nshares: usize,
    source: &mut RandomSource<R>,
) -> Result<Secret> {
    if threshold < 2 {
        return Err(ShamirError::InvalidThreshold(threshold));
    }
    if threshold > nshares {
        return Err(ShamirError::ThresholdExceedsShares {
            threshold,
            shares: nshares,
        });
    }
    if nshares < 2 || nshares > field.group_order() {
        return Err(ShamirError::InvalidShareCount {
            shares: nshares,
            max: field.group_order(),
        });
    }

    let mut id_bytes = [0u8; SECRET_ID_BYTES];
    source.fill(&mut id_bytes)?;
    let id = hex::encode_upper(id_bytes);

    let symbols = bits::unpack(secret, field.degree());
    let degree = threshold - 1;

    let mut random = vec![0u8; degree * symbols.len()];
    source.fill(&mut random)?;
    // 2^m divides 256, so masking a uniform byte gives a uniform element
    let mask = (field.order() - 1) as u8;

    let mut shares: Vec<Share> = (0..nshares)
        .map(|index| {
            Share::new(
                id.clone(),
                field.primitive_polynomial(),
                (index + 1) as Element,
                vec![0; symbols.len()],
            )
        })
        .collect();

    let mut coefficients: Vec<Element> = vec![0; threshold];
    for (i, (&symbol, randomness)) in symbols
        .iter()
        .zip(random.chunks_exact(degree))
        .enumerate()
    {
        coefficients[0] = symbol;
        for (coefficient, &byte) in coefficients[1..].iter_mut().zip(randomness) {
            *coefficient = byte & mask;
        }

        for share in shares.iter_mut() {
            let x = share.x();
            share.y_mut()[i] = field.evaluate_polynomial(&coefficients, x);
        }
    }

    coefficients.fill(0);
    random.fill(0);

    debug!("evaluated {} polynomial(s) of degree {}", symbols.len(), degree);
    info!(
        "split secret {} into {} shares with threshold {} over {}",
        id, nshares, threshold, field
    );

    Ok(Secret {
        id,
        primitive_polynomial: field.primitive_polynomial(),
        threshold,
        shares,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconstruct::recover_secret;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Fails a fixed number of times before delegating.
    struct FlakyRng {
        failures: u32,
        inner: StdRng,
    }

    impl RngCore for FlakyRng {
        fn next_u32(&mut self) -> u32 {
            self.inner.next_u32()
        }

        fn next_u64(&mut self) -> u64 {
            self.inner.next_u64()
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            self.inner.fill_bytes(dest)
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> std::result::Result<(), rand::Error> {
            if self.failures > 0 {
                self.failures -= 1;
                return Err(rand::Error::new("entropy unavailable"));
            }
            self.inner.try_fill_bytes(dest)
        }
    }

    impl CryptoRng for FlakyRng {}

    fn flaky(failures: u32, attempts: u32) -> RandomSource<FlakyRng> {
        RandomSource::new(
            FlakyRng {
                failures,
                inner: StdRng::seed_from_u64(7),
            },
            attempts,
        )
    }

    #[test]
    fn test_x_coordinates() {
        let field = GaloisField::new(0x11d).unwrap();
        let secret = split_secret(&field, b"coordinates", 3, 7).unwrap();
        let xs: Vec<u8> = secret.shares().iter().map(|s| s.x()).collect();
        assert_eq!(xs, (1..=7).collect::<Vec<u8>>());
    }

    #[test]
    fn test_shares_agree_on_metadata() {
        let field = GaloisField::new(0x12b).unwrap();
        let secret = split_secret(&field, b"metadata", 2, 4).unwrap();
        assert_eq!(secret.id().len(), 2 * SECRET_ID_BYTES);
        assert_eq!(secret.threshold(), 2);
        for share in secret.shares() {
            assert_eq!(share.secret_id(), secret.id());
            assert_eq!(share.primitive_polynomial(), 0x12b);
            assert_eq!(share.y().len(), 8);
        }
    }

    #[test]
    fn test_fresh_id_per_split() {
        let field = GaloisField::new(0x11d).unwrap();
        let a = split_secret(&field, b"same", 2, 3).unwrap();
        let b = split_secret(&field, b"same", 2, 3).unwrap();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_invalid_parameters() {
        let field = GaloisField::new(0x11d).unwrap();
        assert!(matches!(
            split_secret(&field, b"x", 1, 5),
            Err(ShamirError::InvalidThreshold(1))
        ));
        assert!(matches!(
            split_secret(&field, b"x", 6, 5),
            Err(ShamirError::ThresholdExceedsShares { threshold: 6, shares: 5 })
        ));
        assert!(matches!(
            split_secret(&field, b"x", 2, 256),
            Err(ShamirError::InvalidShareCount { shares: 256, max: 255 })
        ));

        let small = GaloisField::new(0x13).unwrap();
        assert!(matches!(
            split_secret(&small, b"x", 2, 16),
            Err(ShamirError::InvalidShareCount { shares: 16, max: 15 })
        ));
    }

    #[test]
    fn test_maximum_share_count() {
        let field = GaloisField::new(0x11d).unwrap();
        let secret = split_secret(&field, b"max", 2, 255).unwrap();
        assert_eq!(secret.shares().last().unwrap().x(), 255);
        let recovered = recover_secret(&secret.shares()[253..]).unwrap();
        assert_eq!(recovered, b"max");
    }

    #[test]
    fn test_small_field_symbols() {
        let field = GaloisField::new(0x19).unwrap();
        let secret = split_secret(&field, b"nibbles", 3, 5).unwrap();
        for share in secret.shares() {
            assert_eq!(share.y().len(), 14);
            assert!(share.y().iter().all(|&y| y < 16));
        }
    }

    #[test]
    fn test_random_retry() {
        let field = GaloisField::new(0x11d).unwrap();
        let secret = split_secret_with(&field, b"retry", 2, 3, &mut flaky(2, 3)).unwrap();
        assert_eq!(recover_secret(&secret.shares()[..2]).unwrap(), b"retry");
    }

    #[test]
    fn test_random_failure_surfaces() {
        let field = GaloisField::new(0x11d).unwrap();
        let err = split_secret_with(&field, b"retry", 2, 3, &mut flaky(5, 3)).unwrap_err();
        assert!(matches!(err, ShamirError::RandomSourceFailure { attempts: 3, .. }));
    }

    #[test]
    fn test_display_lists_shares() {
        let field = GaloisField::new(0x11d).unwrap();
        let secret = split_secret(&field, b"shown", 2, 2).unwrap();
        let text = secret.to_string();
        assert!(text.starts_with(&format!("Secret {}\nShares:\n  shamir-", secret.id())));
        assert_eq!(text.lines().count(), 4);
    }
}
