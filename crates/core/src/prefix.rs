//! Validated barcode prefixes.
//!
//! A prefix is the short namespace identifier scoping a family of barcodes,
//! for example `SANG` or `NIRE`. This module provides the canonical wrapper
//! type used throughout the core.

use crate::error::{BarcodeError, BarcodeResult};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// A validated barcode prefix (1-10 uppercase ASCII letters or digits).
///
/// This wrapper type guarantees that once constructed, the contained prefix
/// matches the accepted pattern. Hosts are expected to check prefixes against
/// their configured allow-list before constructing operations; this type
/// re-validates syntactically regardless, so a `Prefix` in hand is always
/// safe to embed in a formatted barcode.
///
/// # Construction
/// - [`Prefix::parse`] validates an externally supplied identifier.
/// - [`Prefix::is_valid`] is the underlying syntactic check, usable for
///   pre-validation without allocating.
///
/// # Errors
/// [`Prefix::parse`] returns [`BarcodeError::InvalidPrefix`] if the input
/// does not match the pattern.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Prefix(String);

impl Prefix {
    /// Validates and wraps a prefix string.
    ///
    /// # Arguments
    ///
    /// * `input` - Candidate prefix. Must be 1-10 characters, each an
    ///   uppercase ASCII letter or digit.
    ///
    /// # Errors
    ///
    /// Returns [`BarcodeError::InvalidPrefix`] if `input` is not valid.
    pub fn parse(input: &str) -> BarcodeResult<Self> {
        if Self::is_valid(input) {
            return Ok(Self(input.to_string()));
        }
        Err(BarcodeError::InvalidPrefix {
            prefix: input.to_string(),
        })
    }

    /// Returns true if `input` matches the accepted prefix pattern.
    ///
    /// This is a purely syntactic check:
    /// - 1 to 10 bytes long
    /// - only uppercase ASCII letters (`A-Z`) and digits (`0-9`)
    pub fn is_valid(input: &str) -> bool {
        (1..=10).contains(&input.len())
            && input.bytes().all(|b| matches!(b, b'A'..=b'Z' | b'0'..=b'9'))
    }

    /// Returns the prefix as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Prefix {
    type Err = BarcodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Prefix::parse(s)
    }
}

impl TryFrom<String> for Prefix {
    type Error = BarcodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Prefix::parse(&value)
    }
}

impl From<Prefix> for String {
    fn from(prefix: Prefix) -> Self {
        prefix.0
    }
}
