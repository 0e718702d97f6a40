//! Error types for FolioDB
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using FolioError
pub type Result<T> = std::result::Result<T, FolioError>;

/// Unified error type for FolioDB operations
#[derive(Debug, Error)]
pub enum FolioError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Schema / Argument Errors (rejected before any state change)
    // -------------------------------------------------------------------------
    #[error("Invalid table name: {0:?}")]
    InvalidName(String),

    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    #[error("Unknown column '{column}' in table '{table}'")]
    UnknownColumn { table: String, column: String },

    #[error("Tuple arity {got} does not match schema arity {expected}")]
    ArityMismatch { expected: usize, got: usize },

    // -------------------------------------------------------------------------
    // Lookup Errors (expected, recoverable conditions)
    // -------------------------------------------------------------------------
    #[error("Table '{0}' not found")]
    TableNotFound(String),

    #[error("Table '{0}' already exists")]
    TableExists(String),

    #[error("Tuple not found at global index {0}")]
    TupleNotFound(usize),

    // -------------------------------------------------------------------------
    // Storage Errors
    // -------------------------------------------------------------------------
    /// A page the table believes it has could not be retrieved from the
    /// backend. Distinct from TupleNotFound because it drives recovery.
    #[error("Page {page} of table '{table}' is unavailable in the backend")]
    PageUnavailable { table: String, page: usize },

    /// The insert algorithm never appends to a full page; reaching this
    /// means a caller skipped the `is_full` check.
    #[error("Page {page} is full (capacity {capacity})")]
    CapacityExceeded { page: usize, capacity: usize },

    /// The registry says a column is indexed but the backend has no blob
    /// for it. Indicates registry/backend desynchronization.
    #[error("Index on '{table}.{column}' is registered but missing from the backend")]
    IndexMissing { table: String, column: String },

    #[error("Corrupt blob for {0}: checksum mismatch")]
    Corruption(String),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<bincode::Error> for FolioError {
    fn from(e: bincode::Error) -> Self {
        FolioError::Serialization(e.to_string())
    }
}
