//! Storage traits and error types
//!
//! This module defines the key-value interface the crawl writes through and
//! the associated error types.

use crate::storage::{DictionaryEntry, MergeOutcome, ParadigmEntry, StoreKind};
use std::collections::BTreeSet;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Corrupt entry {}: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid store key: {0:?}")]
    InvalidKey(String),

    #[error("The {0} store is not configured")]
    KindDisabled(StoreKind),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Key-value store of harvested entries, keyed by title hash
///
/// Implementations must tolerate concurrent calls from many workers. Calls
/// for different keys may proceed in parallel; calls for the same key must
/// behave as if serialized, so no merge is ever lost.
pub trait EntryStore: Send + Sync {
    /// Reads the dictionary entry for a hash
    ///
    /// # Returns
    ///
    /// * `Ok(None)` - No entry exists
    /// * `Err(StorageError::Corrupt)` - The entry exists but cannot be parsed
    fn get_definitions(&self, hash: &str) -> StorageResult<Option<DictionaryEntry>>;

    /// Merges definitions into the entry for a hash
    ///
    /// Creates the entry with `word` when absent. Otherwise writes the union
    /// of existing and new definitions, skipping the write when the union
    /// adds nothing. A corrupt existing entry counts as empty.
    fn merge_definitions(
        &self,
        hash: &str,
        word: &str,
        definitions: &BTreeSet<String>,
    ) -> StorageResult<MergeOutcome>;

    /// Reads the paradigm entry for a hash
    fn get_paradigm(&self, hash: &str) -> StorageResult<Option<ParadigmEntry>>;

    /// Writes a paradigm entry unless one already exists
    ///
    /// Returns `true` when the entry was written. A corrupt existing entry
    /// counts as absent and is replaced.
    fn put_paradigm_if_absent(&self, hash: &str, entry: &ParadigmEntry) -> StorageResult<bool>;
}
