//! Error types for barcode allocation.
//!
//! The taxonomy is deliberately small: a construction-time prefix gate, a
//! scheme-resolution failure, and storage failures propagated unchanged from
//! the persistence collaborator. There is no retry policy anywhere in the
//! core; a failed allocation or commit is terminal for that call and the
//! only local recovery action is transaction rollback.

use thiserror::Error;

/// Failures raised by the persistence store.
///
/// The store is an external collaborator; these variants carry the backend's
/// own message so the original cause is never discarded on the way to the
/// caller.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store connection error: {0}")]
    Connection(String),
    #[error("store query error: {0}")]
    Query(String),
    #[error("store execution error: {0}")]
    Execution(String),
}

/// Errors surfaced by barcode operations.
#[derive(Debug, Error)]
pub enum BarcodeError {
    /// The prefix is not 1 to 10 uppercase ASCII letters or digits.
    ///
    /// Raised synchronously at construction; no operation proceeds afterward.
    #[error("invalid prefix '{prefix}': expected 1-10 uppercase ASCII letters or digits")]
    InvalidPrefix { prefix: String },

    /// No formatter scheme is registered under the requested name.
    #[error("unknown formatter scheme '{0}'")]
    UnknownScheme(String),

    /// A storage failure, propagated unchanged from the store.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Configuration could not be parsed.
    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

pub type BarcodeResult<T> = std::result::Result<T, BarcodeError>;
pub type StoreResult<T> = std::result::Result<T, StoreError>;
