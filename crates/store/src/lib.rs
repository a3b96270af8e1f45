//! # Labcode Store
//!
//! Embedded SQLite implementation of the `labcode-core` persistence traits.
//!
//! Hosts construct a [`SqliteStore`], seed the configured sequence with
//! [`SqliteStore::ensure_sequence`], and hand the store to
//! `BarcodeOperations` as an `Arc<dyn BarcodeStore>`. Everything the core
//! needs — atomic counter advancement, transactional inserts with
//! rollback-on-drop, and the last-barcode query — lives here.

pub mod sqlite;

pub use sqlite::{SqliteStore, SqliteTransaction};

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use labcode_core::records::{Barcode, NewBarcode};
    use labcode_core::store::{BarcodeStore, SequenceAllocator, StoreTransaction};
    use labcode_core::{BarcodeError, BarcodeOperations, ServiceConfig, StoreError, StoreResult};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn sang_ops(store: Arc<SqliteStore>) -> BarcodeOperations {
        let config = ServiceConfig::development();
        assert!(config.is_allowed("SANG"));
        store
            .ensure_sequence(config.sequence_name(), config.sequence_start())
            .unwrap();
        BarcodeOperations::new(store, config.sequence_name(), "SANG").unwrap()
    }

    #[test]
    fn test_create_barcode_end_to_end() {
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        let ops = sang_ops(store.clone());

        let first = ops.create_barcode().unwrap();
        let second = ops.create_barcode().unwrap();

        assert_eq!(first.barcode, "SANG-1");
        assert_eq!(second.barcode, "SANG-2");
        assert!(second.id > first.id);

        let last = store.last_barcode("SANG").unwrap().unwrap();
        assert_eq!(last.id, second.id);
        assert_eq!(last.barcode, second.barcode);
    }

    #[test]
    fn test_sanger_example_barcode() {
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        store.ensure_sequence("heron", 255).unwrap();
        let ops = BarcodeOperations::new(store, "heron", "SANG").unwrap();

        assert_eq!(ops.create_barcode().unwrap().barcode, "SANG-FF");
    }

    #[test]
    fn test_group_of_five_has_consecutive_members() {
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        let ops = sang_ops(store.clone());

        let group = ops.create_barcode_group(5).unwrap();
        let members = store.barcodes_in_group(group.id).unwrap();

        assert_eq!(members.len(), 5);
        let expected: Vec<_> = (1..=5).map(|v| format!("SANG-{:X}", v)).collect();
        let actual: Vec<_> = members.iter().map(|b| b.barcode.clone()).collect();
        assert_eq!(actual, expected);
        for member in &members {
            assert_eq!(member.group_id, Some(group.id));
        }
    }

    #[test]
    fn test_group_of_zero_commits_an_empty_group() {
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        let ops = sang_ops(store.clone());

        let group = ops.create_barcode_group(0).unwrap();

        assert!(store.barcodes_in_group(group.id).unwrap().is_empty());
        // The counter was not advanced by the empty batch.
        assert_eq!(ops.create_barcode().unwrap().barcode, "SANG-1");
    }

    #[test]
    fn test_get_last_barcode_scoped_to_prefix() {
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        let sang = sang_ops(store.clone());
        let nire = BarcodeOperations::new(store, "heron", "NIRE").unwrap();

        sang.create_barcode().unwrap();
        let nire_barcode = nire.create_barcode().unwrap();
        let sang_barcode = sang.create_barcode().unwrap();

        assert_eq!(sang.get_last_barcode().unwrap().unwrap().id, sang_barcode.id);
        assert_eq!(nire.get_last_barcode().unwrap().unwrap().id, nire_barcode.id);
    }

    #[test]
    fn test_get_last_barcode_none_without_history() {
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        let ops = sang_ops(store);

        assert!(ops.get_last_barcode().unwrap().is_none());
    }

    /// Store wrapper that fails the nth barcode insert, for exercising the
    /// all-or-nothing guarantee against a real database.
    struct FailingStore {
        inner: SqliteStore,
        fail_on_insert: usize,
        inserts: AtomicUsize,
    }

    struct FailingTransaction<'a> {
        inner: Box<dyn StoreTransaction + 'a>,
        fail_on_insert: usize,
        inserts: &'a AtomicUsize,
    }

    impl SequenceAllocator for FailingStore {
        fn next(&self, sequence: &str) -> StoreResult<u64> {
            self.inner.next(sequence)
        }

        fn next_n(&self, sequence: &str, count: usize) -> StoreResult<Vec<u64>> {
            self.inner.next_n(sequence, count)
        }
    }

    impl SequenceAllocator for FailingTransaction<'_> {
        fn next(&self, sequence: &str) -> StoreResult<u64> {
            self.inner.next(sequence)
        }

        fn next_n(&self, sequence: &str, count: usize) -> StoreResult<Vec<u64>> {
            self.inner.next_n(sequence, count)
        }
    }

    impl StoreTransaction for FailingTransaction<'_> {
        fn insert_group(&self, created_at: DateTime<Utc>) -> StoreResult<i64> {
            self.inner.insert_group(created_at)
        }

        fn insert_barcode(&self, record: &NewBarcode<'_>) -> StoreResult<i64> {
            let n = self.inserts.fetch_add(1, Ordering::SeqCst) + 1;
            if n == self.fail_on_insert {
                return Err(StoreError::Execution("simulated insert failure".into()));
            }
            self.inner.insert_barcode(record)
        }

        fn commit(self: Box<Self>) -> StoreResult<()> {
            self.inner.commit()
        }
    }

    impl BarcodeStore for FailingStore {
        fn begin(&self) -> StoreResult<Box<dyn StoreTransaction + '_>> {
            Ok(Box::new(FailingTransaction {
                inner: self.inner.begin()?,
                fail_on_insert: self.fail_on_insert,
                inserts: &self.inserts,
            }))
        }

        fn last_barcode(&self, prefix: &str) -> StoreResult<Option<Barcode>> {
            self.inner.last_barcode(prefix)
        }

        fn barcodes_in_group(&self, group_id: i64) -> StoreResult<Vec<Barcode>> {
            self.inner.barcodes_in_group(group_id)
        }
    }

    #[test]
    fn test_failure_on_third_insert_leaves_nothing_committed() {
        let store = Arc::new(FailingStore {
            inner: SqliteStore::open_in_memory().unwrap(),
            fail_on_insert: 3,
            inserts: AtomicUsize::new(0),
        });
        let ops = BarcodeOperations::new(store.clone(), "heron", "SANG").unwrap();

        let result = ops.create_barcode_group(5);
        assert!(matches!(
            result,
            Err(BarcodeError::Store(StoreError::Execution(_)))
        ));

        // All-or-nothing: no barcodes, no orphan group, counter rolled back.
        assert!(store.inner.last_barcode("SANG").unwrap().is_none());
        assert!(store.inner.barcodes_in_group(1).unwrap().is_empty());
        assert_eq!(store.inner.next("heron").unwrap(), 1);
    }
}
