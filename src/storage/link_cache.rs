//! Cache of discovered item links, keyed by dictionary subset

use crate::storage::json_store::{read_json, write_json_atomic};
use crate::storage::traits::{StorageError, StorageResult};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Previously discovered link lists, one per subset key
#[derive(Debug, Clone)]
pub struct LinkCache {
    path: PathBuf,
    entries: BTreeMap<String, Vec<String>>,
}

impl LinkCache {
    /// Loads the cache file, starting empty when it is missing or unreadable
    pub fn load(path: &Path) -> StorageResult<Self> {
        let entries = match read_json::<BTreeMap<String, Vec<String>>>(path) {
            Ok(Some(entries)) => entries,
            Ok(None) => BTreeMap::new(),
            Err(StorageError::Corrupt { path, source }) => {
                tracing::warn!("Ignoring corrupt link cache {}: {}", path.display(), source);
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };

        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    /// Cached links for a subset
    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    /// Replaces the links cached for a subset
    pub fn insert(&mut self, key: &str, links: Vec<String>) {
        self.entries.insert(key.to_string(), links);
    }

    /// Writes every subset back to the cache file
    pub fn save(&self) -> StorageResult<()> {
        write_json_atomic(&self.path, &self.entries)
    }
}
