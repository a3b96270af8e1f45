//! Persistence collaborator traits.
//!
//! The core never talks to a database directly; it drives these traits and
//! relies on the implementation for atomicity. Uniqueness across concurrent
//! callers comes entirely from the store's atomic counter increment; the
//! core holds no in-process lock and must not attempt to serialize calls
//! itself, since multiple service instances may run against the same store.

use crate::error::StoreResult;
use crate::records::{Barcode, NewBarcode};
use chrono::{DateTime, Utc};

/// Obtains strictly increasing integers from a named, durable counter.
///
/// # Invariants
/// - For a given sequence name, no two allocations ever return the same
///   value, even under concurrent callers.
/// - `next_n` returns the `count` consecutive values immediately following
///   the counter's prior state, in increasing order, with no gaps skipped.
///
/// Sequence names are case-insensitive; implementations normalise them to
/// lowercase. A sequence that does not exist yet is created lazily at the
/// store's configured start value.
pub trait SequenceAllocator {
    /// Returns the next unused value from `sequence`.
    fn next(&self, sequence: &str) -> StoreResult<u64>;

    /// Returns the next `count` unused values from `sequence`, in
    /// increasing order. `count == 0` returns an empty vec without
    /// advancing the counter.
    fn next_n(&self, sequence: &str, count: usize) -> StoreResult<Vec<u64>>;
}

/// A transaction scope over the store.
///
/// All writes (and the counter advancement backing them) happen inside one
/// transaction so that counter state and persisted records never diverge.
/// Dropping an uncommitted transaction rolls everything back; commit is the
/// only path that makes the writes durable.
pub trait StoreTransaction: SequenceAllocator {
    /// Inserts a group row and returns its assigned identity.
    fn insert_group(&self, created_at: DateTime<Utc>) -> StoreResult<i64>;

    /// Inserts a barcode row and returns its assigned identity.
    fn insert_barcode(&self, record: &NewBarcode<'_>) -> StoreResult<i64>;

    /// Commits the transaction, making all staged writes durable.
    fn commit(self: Box<Self>) -> StoreResult<()>;
}

/// Durable storage for counters, barcode records, and group records.
pub trait BarcodeStore: SequenceAllocator + Send + Sync {
    /// Opens a transaction scope for a create operation.
    fn begin(&self) -> StoreResult<Box<dyn StoreTransaction + '_>>;

    /// Returns the most recently inserted barcode for `prefix` (highest
    /// identity first), or `None` if the prefix has no history.
    fn last_barcode(&self, prefix: &str) -> StoreResult<Option<Barcode>>;

    /// Returns the member barcodes of a group, in insertion order.
    fn barcodes_in_group(&self, group_id: i64) -> StoreResult<Vec<Barcode>>;
}
