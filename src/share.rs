use core::fmt;
use serde::{Deserialize, Serialize};

use crate::codec;
use crate::field::Element;

/// One evaluation point of every per-byte polynomial of a secret.
///
/// A share is self-describing: it names the secret it belongs to and the primitive polynomial of
/// the field it was computed in, so it can be stored and later recovered with no reference back
/// to the split that produced it.
///
/// # Fields
///
/// * `secret_id` - Random identifier shared by every share of one split.
/// * `primitive_polynomial` - Polynomial generating the field, as a bitmask.
/// * `x` - Nonzero x-coordinate, `index + 1` at split time.
/// * `y` - One field element per secret symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Share {
    secret_id: String,
    primitive_polynomial: u32,
    x: Element,
    y: Vec<Element>,
}

impl Share {
    pub fn new(secret_id: impl Into<String>, primitive_polynomial: u32, x: Element, y: Vec<Element>) -> Self {
        Share {
            secret_id: secret_id.into(),
            primitive_polynomial,
            x,
            y,
        }
    }

    pub fn secret_id(&self) -> &str {
        &self.secret_id
    }

    pub fn primitive_polynomial(&self) -> u32 {
        self.primitive_polynomial
    }

    pub fn x(&self) -> Element {
        self.x
    }

    pub fn y(&self) -> &[Element] {
        &self.y
    }

    pub(crate) fn y_mut(&mut self) -> &mut [Element] {
        &mut self.y
    }

    /// Human-readable name, `{tag}-{secret_id}-{polynomial hex}-{x}`, used for file names and
    /// printed labels. It never contains y-values.
    pub fn label(&self) -> String {
        codec::label(self)
    }

    /// The canonical one-line text encoding.
    pub fn encode(&self) -> String {
        codec::encode(self)
    }
}

impl fmt::Display for Share {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl std::str::FromStr for Share {
    type Err = crate::error::ShamirError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        codec::decode(s)
    }
}

/// What the output layer needs for one share: the label to name it by and the encoding to write
/// or embed in a QR code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareRecord {
    pub label: String,
    pub encoded: String,
    pub x: Element,
}

impl From<&Share> for ShareRecord {
    fn from(share: &Share) -> Self {
        ShareRecord {
            label: share.label(),
            encoded: share.encode(),
            x: share.x(),
        }
    }
}
