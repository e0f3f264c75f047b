//! Storage module for persisting harvested entries
//!
//! This module handles everything the crawl writes to disk:
//! - One JSON file per title hash for dictionary entries
//! - An optional parallel directory of paradigm entries
//! - The hash -> title index, flushed once per run
//! - The discovered-links cache

mod index;
mod json_store;
mod link_cache;
mod traits;

pub use index::TitleIndex;
pub use json_store::JsonStore;
pub use link_cache::LinkCache;
pub use traits::{EntryStore, StorageError, StorageResult};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Computes the store key for a normalized title
///
/// The key is the hex SHA-256 of the lower-cased title, so it is stable
/// across runs and casing variants of one title share an entry.
///
/// # Examples
///
/// ```
/// use lexicon_ripple::storage::title_hash;
///
/// assert_eq!(title_hash("Amo"), title_hash("amo"));
/// assert_eq!(title_hash("amo").len(), 64);
/// ```
pub fn title_hash(title: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(title.to_lowercase().as_bytes());
    hex::encode(hasher.finalize())
}

/// Which directory of the store an entry lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKind {
    Dictionary,
    Paradigm,
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dictionary => write!(f, "dictionary"),
            Self::Paradigm => write!(f, "paradigm"),
        }
    }
}

/// Result of merging definitions into the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// No entry existed; one was written
    Created,
    /// The union added definitions; the entry was rewritten
    Updated,
    /// Every definition was already present; nothing was written
    Unchanged,
}

/// Forms of one inflection table: column label -> row label -> forms
pub type ParadigmTable = BTreeMap<String, BTreeMap<String, BTreeSet<String>>>;

/// On-disk dictionary entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryEntry {
    /// Title as first written, case preserved
    pub word: String,

    /// Union of every definition seen for the title
    pub definitions: BTreeSet<String>,
}

/// On-disk paradigm entry
///
/// Serialized as `{"word": .., "forms": .., "0": {..}, "1": {..}}` with one
/// numbered key per inflection table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParadigmEntry {
    pub word: String,

    /// Number of forms across all tables
    pub forms: usize,

    #[serde(flatten)]
    pub tables: BTreeMap<String, ParadigmTable>,
}
