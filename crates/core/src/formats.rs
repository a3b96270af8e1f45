//! Barcode formatting schemes.
//!
//! A scheme is a pure function from `(prefix, allocated value)` to the
//! canonical barcode string. Schemes are registered by name in a
//! [`FormatterRegistry`] so that new layouts can be added without touching
//! existing ones; the operations layer resolves a scheme once at
//! construction and never again.
//!
//! Every scheme must be injective per prefix: distinct allocated values
//! under the same prefix must never format to the same string. The built-in
//! scheme renders the value in uppercase hexadecimal with no zero padding,
//! so injectivity follows directly from the hex rendering.

use crate::error::{BarcodeError, BarcodeResult};
use crate::prefix::Prefix;
use std::collections::HashMap;

/// A pure barcode formatting function.
///
/// Implementations must be referentially transparent: identical inputs
/// always yield identical output, with no I/O and no shared state.
pub type FormatFn = fn(&Prefix, u64) -> String;

/// Name of the built-in scheme registered by [`FormatterRegistry::default`].
pub const HERON_SCHEME: &str = "heron";

/// The Heron layout: `{prefix}-{HEX}` with uppercase, unpadded hex digits.
///
/// Example: `("SANG", 255)` formats to `"SANG-FF"`.
fn heron_format(prefix: &Prefix, value: u64) -> String {
    format!("{}-{:X}", prefix, value)
}

/// Registry of formatting schemes, keyed by scheme name.
///
/// The default registry contains the Heron scheme. Hosts serving prefixes
/// with different layouts register additional schemes at startup.
#[derive(Clone, Debug)]
pub struct FormatterRegistry {
    schemes: HashMap<String, FormatFn>,
}

impl Default for FormatterRegistry {
    fn default() -> Self {
        let mut registry = Self {
            schemes: HashMap::new(),
        };
        registry.register(HERON_SCHEME, heron_format);
        registry
    }
}

impl FormatterRegistry {
    /// Registers a scheme under `name`, replacing any previous registration.
    pub fn register(&mut self, name: &str, format: FormatFn) {
        self.schemes.insert(name.to_string(), format);
    }

    /// Resolves `scheme` for `prefix`, binding them into a formatter.
    ///
    /// # Errors
    ///
    /// Returns [`BarcodeError::UnknownScheme`] if no scheme is registered
    /// under `scheme`.
    pub fn resolve(&self, scheme: &str, prefix: Prefix) -> BarcodeResult<BarcodeFormatter> {
        let format = self
            .schemes
            .get(scheme)
            .copied()
            .ok_or_else(|| BarcodeError::UnknownScheme(scheme.to_string()))?;

        Ok(BarcodeFormatter { prefix, format })
    }
}

/// A formatting scheme bound to a prefix.
///
/// Produced by [`FormatterRegistry::resolve`]; holds no I/O handles and no
/// mutable state, so it is safe to call any number of times.
#[derive(Clone, Debug)]
pub struct BarcodeFormatter {
    prefix: Prefix,
    format: FormatFn,
}

impl BarcodeFormatter {
    /// Formats an allocated value into its canonical barcode string.
    pub fn format(&self, value: u64) -> String {
        (self.format)(&self.prefix, value)
    }

    /// Returns the bound prefix.
    pub fn prefix(&self) -> &Prefix {
        &self.prefix
    }
}
