//! Barcode allocation operations.
//!
//! [`BarcodeOperations`] is the orchestrator: it validates a prefix at
//! construction, drives the sequence allocator, invokes the formatter, and
//! persists the resulting records as one atomic unit. Each create call uses
//! a single transaction scope — acquire counter value(s), build records,
//! write, commit — with rollback as the only exit path on error.
//!
//! The instance is stateless between calls aside from its bound prefix,
//! sequence name, and resolved formatter.

use crate::error::BarcodeResult;
use crate::formats::{BarcodeFormatter, FormatterRegistry, HERON_SCHEME};
use crate::prefix::Prefix;
use crate::records::{Barcode, BarcodesGroup, NewBarcode};
use crate::store::BarcodeStore;
use chrono::Utc;
use std::sync::Arc;
use tracing::debug;

/// Orchestrates barcode creation against a bound sequence and prefix.
pub struct BarcodeOperations {
    store: Arc<dyn BarcodeStore>,
    sequence_name: String,
    formatter: BarcodeFormatter,
}

impl BarcodeOperations {
    /// Creates operations bound to `sequence_name` and `prefix`, using the
    /// default formatter registry and the Heron scheme.
    ///
    /// # Errors
    ///
    /// Returns [`BarcodeError::InvalidPrefix`](crate::BarcodeError::InvalidPrefix)
    /// if the prefix is not 1-10 uppercase ASCII letters or digits. This
    /// gate runs once, synchronously, before any allocation can occur.
    pub fn new(
        store: Arc<dyn BarcodeStore>,
        sequence_name: &str,
        prefix: &str,
    ) -> BarcodeResult<Self> {
        Self::with_scheme(
            store,
            sequence_name,
            prefix,
            HERON_SCHEME,
            &FormatterRegistry::default(),
        )
    }

    /// Creates operations with an explicit formatter scheme.
    ///
    /// The scheme is resolved once here; per-call formatting never consults
    /// the registry again.
    ///
    /// # Errors
    ///
    /// Returns [`BarcodeError::InvalidPrefix`](crate::BarcodeError::InvalidPrefix)
    /// for a malformed prefix, or
    /// [`BarcodeError::UnknownScheme`](crate::BarcodeError::UnknownScheme)
    /// if `scheme` is not registered.
    pub fn with_scheme(
        store: Arc<dyn BarcodeStore>,
        sequence_name: &str,
        prefix: &str,
        scheme: &str,
        registry: &FormatterRegistry,
    ) -> BarcodeResult<Self> {
        let prefix = Prefix::parse(prefix)?;
        let formatter = registry.resolve(scheme, prefix)?;

        Ok(Self {
            store,
            sequence_name: sequence_name.to_string(),
            formatter,
        })
    }

    /// Returns the bound prefix.
    pub fn prefix(&self) -> &Prefix {
        self.formatter.prefix()
    }

    /// Returns the bound sequence name.
    pub fn sequence_name(&self) -> &str {
        &self.sequence_name
    }

    /// Creates and persists one barcode with no group reference.
    ///
    /// Allocation, formatting, and the insert run in one transaction; any
    /// failure rolls the transaction back and propagates unchanged, so a
    /// returned error means nothing was durably created.
    pub fn create_barcode(&self) -> BarcodeResult<Barcode> {
        let txn = self.store.begin()?;

        let value = txn.next(&self.sequence_name)?;
        let created_at = Utc::now();
        let formatted = self.formatter.format(value);

        let id = txn.insert_barcode(&NewBarcode {
            prefix: self.prefix().as_str(),
            barcode: &formatted,
            created_at,
            group_id: None,
        })?;

        txn.commit()?;

        debug!(barcode = %formatted, id, "created barcode");

        Ok(Barcode {
            id,
            prefix: self.prefix().as_str().to_string(),
            barcode: formatted,
            created_at,
            group_id: None,
        })
    }

    /// Creates a group and `count` barcodes referencing it, atomically.
    ///
    /// The group row is inserted first so the children can reference its
    /// identity; barcodes are formatted and inserted in allocation order.
    /// Either the group and all `count` barcodes are committed, or none are.
    ///
    /// `count == 0` is accepted and commits an empty group; the counter is
    /// not advanced.
    pub fn create_barcode_group(&self, count: usize) -> BarcodeResult<BarcodesGroup> {
        let txn = self.store.begin()?;

        let values = txn.next_n(&self.sequence_name, count)?;
        let created_at = Utc::now();
        let group_id = txn.insert_group(created_at)?;

        for value in values {
            let formatted = self.formatter.format(value);
            txn.insert_barcode(&NewBarcode {
                prefix: self.prefix().as_str(),
                barcode: &formatted,
                created_at,
                group_id: Some(group_id),
            })?;
        }

        txn.commit()?;

        debug!(group_id, count, "created barcode group");

        Ok(BarcodesGroup {
            id: group_id,
            created_at,
        })
    }

    /// Returns the most recently created barcode for the bound prefix, or
    /// `None` if no barcode has ever been created for it.
    ///
    /// Read-only; no transaction side effects.
    pub fn get_last_barcode(&self) -> BarcodeResult<Option<Barcode>> {
        Ok(self.store.last_barcode(self.prefix().as_str())?)
    }
}
