use core::fmt;
use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::error::{Result, ShamirError};
use crate::polynomials::{self, MAX_DEGREE, MIN_DEGREE};

/// An element of GF(2^m). With m <= 8 every element fits in a byte.
pub type Element = u8;

/// Marks the undefined logarithm of the zero element.
const LOG_OF_ZERO: u8 = u8::MAX;

/// The binary extension field GF(2^m) generated by a primitive polynomial.
///
/// Multiplication and division go through discrete log/antilog tables built by walking the
/// powers of the generator `x`. The tables are immutable once built, so a field can be shared by
/// reference (or through an `Arc`) between any number of concurrent split or recovery calls.
///
/// The constructor only checks that the polynomial has the right shape. It does not prove that the
/// polynomial is primitive; validate untrusted input with [`polynomials::validate`] first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GaloisField {
    degree: u32,
    order: usize,
    primitive_polynomial: u32,
    log: Vec<u8>,
    antilog: Vec<Element>,
}

impl GaloisField {
    /// Builds the log/antilog tables for the field generated by `primitive_polynomial`.
    ///
    /// # Errors
    ///
    /// Returns [`ShamirError::InvalidPrimitivePolynomial`] when the constant term is missing (such
    /// a polynomial is divisible by `x`) or when the degree is outside 2..=8.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shamir::field::GaloisField;
    ///
    /// let field = GaloisField::new(0x11d).unwrap();
    /// assert_eq!(field.order(), 256);
    /// assert_eq!(field.multiply(2, 128), 0x1d);
    /// ```
    pub fn new(primitive_polynomial: u32) -> Result<Self> {
        if primitive_polynomial & 0b1 != 1 {
            return Err(ShamirError::InvalidPrimitivePolynomial {
                polynomial: primitive_polynomial,
                reason: "constant term is zero, so it cannot be primitive".to_string(),
            });
        }

        let degree = polynomials::degree(primitive_polynomial);
        if !(MIN_DEGREE..=MAX_DEGREE).contains(&degree) {
            return Err(ShamirError::InvalidPrimitivePolynomial {
                polynomial: primitive_polynomial,
                reason: format!(
                    "degree {degree} is outside the supported range {MIN_DEGREE}..={MAX_DEGREE}"
                ),
            });
        }

        let order = 1usize << degree;
        let mut log = vec![0u8; order];
        let mut antilog = vec![0 as Element; order];

        let mut element: u32 = 1;
        for exponent in 0..order - 1 {
            antilog[exponent] = element as Element;
            log[element as usize] = exponent as u8;

            element <<= 1;
            if element & (1 << degree) != 0 {
                element ^= primitive_polynomial;
            }
        }

        log[0] = LOG_OF_ZERO;
        log[1] = 0;
        antilog[order - 1] = antilog[0];

        debug!("built GF(2^{}) tables for polynomial 0x{:x}", degree, primitive_polynomial);

        Ok(GaloisField {
            degree,
            order,
            primitive_polynomial,
            log,
            antilog,
        })
    }

    /// The extension degree `m`.
    pub fn degree(&self) -> u32 {
        self.degree
    }

    /// Number of elements, `2^m`.
    pub fn order(&self) -> usize {
        self.order
    }

    pub fn primitive_polynomial(&self) -> u32 {
        self.primitive_polynomial
    }

    /// Size of the multiplicative group, `2^m - 1`. Also the largest usable x-coordinate.
    pub fn group_order(&self) -> usize {
        self.order - 1
    }

    /// Whether `value` is an element of this field.
    pub fn contains(&self, value: Element) -> bool {
        (value as usize) < self.order
    }

    /// Discrete logarithm of a nonzero element to the base `x`.
    pub fn log(&self, a: Element) -> Option<u8> {
        match a {
            0 => None,
            _ => Some(self.log[a as usize]),
        }
    }

    /// `x` raised to `exponent`, reduced modulo the group order.
    pub fn exp(&self, exponent: usize) -> Element {
        self.antilog[exponent % self.group_order()]
    }

    /// Addition is XOR in characteristic 2.
    pub fn add(&self, a: Element, b: Element) -> Element {
        a ^ b
    }

    /// Subtraction is the same operation as addition.
    pub fn subtract(&self, a: Element, b: Element) -> Element {
        a ^ b
    }

    /// Multiplies two elements through the log tables.
    ///
    /// # Panics
    ///
    /// Panics if either operand is not an element of this field, e.g. `200` in GF(2^4).
    pub fn multiply(&self, a: Element, b: Element) -> Element {
        assert!(
            self.contains(a) && self.contains(b),
            "operands {} and {} are not both elements of {}",
            a,
            b,
            self
        );
        if a == 0 || b == 0 {
            return 0;
        }

        let log_a = self.log[a as usize] as usize;
        let log_b = self.log[b as usize] as usize;
        self.antilog[(log_a + log_b) % self.group_order()]
    }

    /// Divides `a` by `b`.
    ///
    /// # Errors
    ///
    /// Returns [`ShamirError::DivisionByZero`] when `b` is zero.
    ///
    /// # Panics
    ///
    /// Panics if either operand is not an element of this field.
    pub fn divide(&self, a: Element, b: Element) -> Result<Element> {
        assert!(
            self.contains(a) && self.contains(b),
            "operands {} and {} are not both elements of {}",
            a,
            b,
            self
        );
        if b == 0 {
            return Err(ShamirError::DivisionByZero);
        }
        if a == 0 {
            return Ok(0);
        }

        let log_a = self.log[a as usize] as usize;
        let log_b = self.log[b as usize] as usize;
        let group_order = self.group_order();
        Ok(self.antilog[(log_a + group_order - log_b) % group_order])
    }

    /// Multiplicative inverse of a nonzero element.
    pub fn inverse(&self, a: Element) -> Result<Element> {
        self.divide(1, a)
    }

    /// Evaluates `coefficients[0] + coefficients[1]*x + ...` at `x` with Horner's method.
    ///
    /// # Panics
    ///
    /// Panics if a coefficient other than the constant term, or `x` when there is at least one
    /// coefficient, is not an element of this field.
    pub fn evaluate_polynomial(&self, coefficients: &[Element], x: Element) -> Element {
        coefficients
            .iter()
            .rev()
            .fold(0, |y, &coefficient| self.add(self.multiply(y, x), coefficient))
    }
}

impl fmt::Display for GaloisField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "GF(2^{}) using primitive polynomial 0x{:x}",
            self.degree, self.primitive_polynomial
        )
    }
}

/// Caller-owned store of fields keyed by primitive polynomial.
///
/// Each field is built at most once and handed out as a shared, read-only `Arc`. Polynomials are
/// checked against the allow-list before a field is built for them.
#[derive(Debug, Default)]
pub struct FieldCache {
    fields: HashMap<u32, Arc<GaloisField>>,
}

impl FieldCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the field for `polynomial`, building it on first use.
    pub fn get(&mut self, polynomial: u32) -> Result<Arc<GaloisField>> {
        if let Some(field) = self.fields.get(&polynomial) {
            return Ok(Arc::clone(field));
        }

        let field = Arc::new(GaloisField::new(polynomials::validate(polynomial)?)?);
        self.fields.insert(polynomial, Arc::clone(&field));
        Ok(field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
