//! Storage error types

use thiserror::Error;

/// Errors raised by the two product stores.
///
/// None of these reach the API boundary: the catalog service recovers from
/// `Unavailable` by substituting the backup snapshot, and the backup store
/// absorbs its own I/O failures.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("primary store unavailable: {0}")]
    Unavailable(#[from] sqlx::Error),

    #[error("snapshot I/O error: {0}")]
    SnapshotIo(#[from] std::io::Error),

    #[error("snapshot parse error: {0}")]
    SnapshotParse(#[from] serde_json::Error),
}
