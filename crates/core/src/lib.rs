//! # Labcode Core
//!
//! Core logic for issuing unique, human-readable barcodes for physical
//! samples, optionally grouped into batches, backed by a persistent
//! monotonic counter per namespace ("sequence").
//!
//! The crate is a library invoked by a host service:
//! - [`Prefix`] validates the namespace identifier once, at construction.
//! - [`FormatterRegistry`] maps scheme names to pure, injective formatting
//!   functions; the built-in Heron scheme renders `{prefix}-{HEX}`.
//! - [`BarcodeOperations`] drives allocation, formatting, and transactional
//!   persistence through the [`store`] traits.
//!
//! **No host concerns**: HTTP/CLI request handling, database connection
//! lifecycle, and environment loading belong to the host. The persistence
//! store is an external collaborator reached through the [`store`] traits;
//! `labcode-store` provides the embedded SQLite implementation.

pub mod config;
pub mod error;
pub mod formats;
pub mod operations;
pub mod prefix;
pub mod records;
pub mod store;

pub use config::{PrefixSpec, ServiceConfig};
pub use error::{BarcodeError, BarcodeResult, StoreError, StoreResult};
pub use formats::{BarcodeFormatter, FormatFn, FormatterRegistry, HERON_SCHEME};
pub use operations::BarcodeOperations;
pub use prefix::Prefix;
pub use records::{Barcode, BarcodesGroup, NewBarcode};
pub use store::{BarcodeStore, SequenceAllocator, StoreTransaction};
