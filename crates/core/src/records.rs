//! Persisted record types.
//!
//! Barcodes and barcode groups are created exactly once at allocation time
//! and are never mutated or deleted by this system. The identity fields are
//! assigned by the persistence store on insert.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persisted barcode record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Barcode {
    /// Store-assigned identity, strictly increasing in insertion order.
    pub id: i64,
    /// Namespace prefix the barcode was issued under.
    pub prefix: String,
    /// Canonical formatted barcode string, unique within its prefix.
    pub barcode: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Owning group, when the barcode was created as part of a batch.
    pub group_id: Option<i64>,
}

/// A persisted batch of barcodes created together in one call.
///
/// The group row is created before its child barcodes so the children can
/// reference its identity; both are committed in the same transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarcodesGroup {
    /// Store-assigned identity.
    pub id: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a barcode row, before the store assigns an identity.
#[derive(Clone, Debug)]
pub struct NewBarcode<'a> {
    pub prefix: &'a str,
    pub barcode: &'a str,
    pub created_at: DateTime<Utc>,
    pub group_id: Option<i64>,
}
