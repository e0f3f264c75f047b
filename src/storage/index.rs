//! Crawl-wide hash -> title index

use crate::storage::json_store::{read_json, write_json_atomic};
use crate::storage::traits::{StorageError, StorageResult};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::path::Path;

/// Maps each title hash to the first title recorded for it
///
/// Shared by every worker; insertion is atomic per key, so the first writer
/// for a hash wins and later writers never replace its title.
#[derive(Debug, Default)]
pub struct TitleIndex {
    entries: DashMap<String, String>,
}

impl TitleIndex {
    /// Creates an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a previously flushed index
    ///
    /// A missing file yields an empty index. So does an unparsable one, after
    /// a warning; the next flush replaces it.
    pub fn load(path: &Path) -> StorageResult<Self> {
        let entries = match read_json::<BTreeMap<String, String>>(path) {
            Ok(Some(entries)) => entries,
            Ok(None) => BTreeMap::new(),
            Err(StorageError::Corrupt { path, source }) => {
                tracing::warn!(
                    "Ignoring corrupt title index {}: {}",
                    path.display(),
                    source
                );
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };

        Ok(Self {
            entries: entries.into_iter().collect(),
        })
    }

    /// Records a title for a hash unless one is already recorded
    ///
    /// Returns `true` when this call recorded the title.
    pub fn insert_if_absent(&self, hash: &str, title: &str) -> bool {
        match self.entries.entry(hash.to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(vacant) => {
                vacant.insert(title.to_string());
                true
            }
        }
    }

    /// Title recorded for a hash
    pub fn get(&self, hash: &str) -> Option<String> {
        self.entries.get(hash).map(|title| title.value().clone())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Writes the whole index as one JSON object sorted by hash
    pub fn flush(&self, path: &Path) -> StorageResult<()> {
        let sorted: BTreeMap<String, String> = self
            .entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();

        write_json_atomic(path, &sorted)?;
        tracing::debug!("Flushed {} index entries to {}", sorted.len(), path.display());
        Ok(())
    }
}
