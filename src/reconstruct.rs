use std::collections::HashSet;

use tracing::{debug, info};

use crate::bits;
use crate::error::{Result, ShamirError};
use crate::field::{Element, FieldCache, GaloisField};
use crate::polynomials;
use crate::share::Share;

/// Recovers a secret from its shares, building the field from the shares' polynomial.
///
/// The shares must all carry the same secret id and polynomial, distinct x-coordinates and
/// y-vectors of equal length; all of that is checked before any interpolation. Passing fewer
/// shares than the split threshold is *not* detected: interpolation still succeeds and returns
/// bytes of the right length that are not the secret.
///
/// # Examples
///
/// ```rust
/// use shamir::field::GaloisField;
/// use shamir::reconstruct::recover_secret;
/// use shamir::split::split_secret;
///
/// let field = GaloisField::new(0x11d).unwrap();
/// let secret = split_secret(&field, b"secret", 2, 5).unwrap();
/// let recovered = recover_secret(&secret.shares()[2..4]).unwrap();
/// assert_eq!(recovered, b"secret");
/// ```
pub fn recover_secret(shares: &[Share]) -> Result<Vec<u8>> {
    let polynomial = check_consistency(shares)?;
    let field = GaloisField::new(polynomials::validate(polynomial)?)?;
    interpolate_secret(&field, shares)
}

/// Recovers a secret using a field the caller already built.
///
/// # Errors
///
/// Besides the consistency errors of [`recover_secret`], fails with
/// [`ShamirError::MismatchedPolynomial`] if the shares were not computed over `field`.
pub fn recover_secret_with(field: &GaloisField, shares: &[Share]) -> Result<Vec<u8>> {
    let polynomial = check_consistency(shares)?;
    if polynomial != field.primitive_polynomial() {
        return Err(ShamirError::MismatchedPolynomial {
            index: 0,
            expected: field.primitive_polynomial(),
            found: polynomial,
        });
    }
    interpolate_secret(field, shares)
}

/// Partitions shares by secret id, keeping ids and shares in order of first occurrence.
pub fn group_by_secret(shares: Vec<Share>) -> Vec<(String, Vec<Share>)> {
    let mut groups: Vec<(String, Vec<Share>)> = Vec::new();
    for share in shares {
        match groups.iter_mut().find(|(id, _)| id == share.secret_id()) {
            Some((_, group)) => group.push(share),
            None => groups.push((share.secret_id().to_string(), vec![share])),
        }
    }
    groups
}

/// Groups shares by secret and recovers each secret, reusing fields through `cache`.
///
/// Fails on the first group that cannot be recovered.
pub fn recover_all(shares: Vec<Share>, cache: &mut FieldCache) -> Result<Vec<(String, Vec<u8>)>> {
    if shares.is_empty() {
        return Err(ShamirError::EmptyShareSet);
    }

    let groups = group_by_secret(shares);
    info!("recovering {} secret(s)", groups.len());

    let mut secrets = Vec::with_capacity(groups.len());
    for (id, group) in groups {
        let polynomial = check_consistency(&group)?;
        let field = cache.get(polynomial)?;
        let secret = interpolate_secret(&field, &group)?;
        secrets.push((id, secret));
    }
    Ok(secrets)
}

/// Checks everything that can be checked without a field and returns the shared polynomial.
fn check_consistency(shares: &[Share]) -> Result<u32> {
    let first = match shares {
        [first, _, ..] => first,
        _ => return Err(ShamirError::InsufficientShares(shares.len())),
    };

    for (index, share) in shares.iter().enumerate().skip(1) {
        if share.secret_id() != first.secret_id() {
            return Err(ShamirError::MismatchedSecretId {
                index,
                expected: first.secret_id().to_string(),
                found: share.secret_id().to_string(),
            });
        }
        if share.primitive_polynomial() != first.primitive_polynomial() {
            return Err(ShamirError::MismatchedPolynomial {
                index,
                expected: first.primitive_polynomial(),
                found: share.primitive_polynomial(),
            });
        }
    }

    let mut seen = HashSet::with_capacity(shares.len());
    for (index, share) in shares.iter().enumerate() {
        if !seen.insert(share.x()) {
            return Err(ShamirError::DuplicateShare { index, x: share.x() });
        }
    }

    let len = first.y().len();
    for (index, share) in shares.iter().enumerate() {
        if share.y().len() != len {
            return Err(ShamirError::MalformedShare {
                index,
                reason: format!("holds {} values, expected {}", share.y().len(), len),
            });
        }
    }

    Ok(first.primitive_polynomial())
}

/// Checks that every coordinate lies in `field`, then interpolates each position at `x = 0`.
fn interpolate_secret(field: &GaloisField, shares: &[Share]) -> Result<Vec<u8>> {
    for (index, share) in shares.iter().enumerate() {
        if share.x() == 0 || !field.contains(share.x()) {
            return Err(ShamirError::MalformedShare {
                index,
                reason: format!("x-coordinate {} is not a nonzero element of {}", share.x(), field),
            });
        }
        if let Some(position) = share.y().iter().position(|&y| !field.contains(y)) {
            return Err(ShamirError::MalformedShare {
                index,
                reason: format!("value at position {position} is outside {field}"),
            });
        }
    }

    let weights = lagrange_weights_at_zero(field, shares)?;
    let len = shares[0].y().len();

    let symbols: Vec<Element> = (0..len)
        .map(|i| {
            shares
                .iter()
                .zip(&weights)
                .fold(0, |acc, (share, &weight)| {
                    field.add(acc, field.multiply(share.y()[i], weight))
                })
        })
        .collect();

    debug!(
        "interpolated {} position(s) from {} shares of secret {}",
        len,
        shares.len(),
        shares[0].secret_id()
    );

    Ok(bits::pack(&symbols, field.degree()))
}

/// `l_j(0) = prod_{k != j} (0 - x_k) / (x_j - x_k)` for each share `j`.
///
/// The basis depends only on the x-coordinates, so it is computed once for all positions.
fn lagrange_weights_at_zero(field: &GaloisField, shares: &[Share]) -> Result<Vec<Element>> {
    shares
        .iter()
        .enumerate()
        .map(|(j, share_j)| {
            shares
                .iter()
                .enumerate()
                .filter(|&(k, _)| k != j)
                .try_fold(1, |weight, (_, share_k)| -> Result<Element> {
                    let numerator = field.subtract(0, share_k.x());
                    let denominator = field.subtract(share_j.x(), share_k.x());
                    Ok(field.multiply(weight, field.divide(numerator, denominator)?))
                })
        })
        .collect()
}
