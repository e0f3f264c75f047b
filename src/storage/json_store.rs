//! Directory-of-files store implementation
//!
//! Each entry is `<dir>/<title_hash>.json`. Writes go to a temporary file in
//! the same directory and are renamed into place, so a reader sees either
//! the old entry or the new one. Read-modify-write cycles for one hash run
//! under a striped mutex, so concurrent workers never lose a merge.

use crate::storage::traits::{EntryStore, StorageError, StorageResult};
use crate::storage::{DictionaryEntry, MergeOutcome, ParadigmEntry, StoreKind};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tempfile::NamedTempFile;

/// Number of mutexes entries are striped over
const LOCK_STRIPES: usize = 64;

/// JSON-file backed entry store
#[derive(Debug)]
pub struct JsonStore {
    dictionary_dir: PathBuf,
    paradigm_dir: Option<PathBuf>,
    locks: Vec<Mutex<()>>,
}

impl JsonStore {
    /// Opens the store, creating its directories when missing
    ///
    /// # Arguments
    ///
    /// * `dictionary_dir` - Directory of dictionary entries
    /// * `paradigm_dir` - Directory of paradigm entries, if paradigms are kept
    pub fn open(dictionary_dir: &Path, paradigm_dir: Option<&Path>) -> StorageResult<Self> {
        fs::create_dir_all(dictionary_dir)?;
        if let Some(dir) = paradigm_dir {
            fs::create_dir_all(dir)?;
        }

        Ok(Self {
            dictionary_dir: dictionary_dir.to_path_buf(),
            paradigm_dir: paradigm_dir.map(Path::to_path_buf),
            locks: (0..LOCK_STRIPES).map(|_| Mutex::new(())).collect(),
        })
    }

    /// Directory holding entries of the given kind
    pub fn dir(&self, kind: StoreKind) -> Option<&Path> {
        match kind {
            StoreKind::Dictionary => Some(&self.dictionary_dir),
            StoreKind::Paradigm => self.paradigm_dir.as_deref(),
        }
    }

    /// Path of the entry file for a hash
    pub fn entry_path(&self, kind: StoreKind, hash: &str) -> StorageResult<PathBuf> {
        if hash.is_empty() || !hash.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(StorageError::InvalidKey(hash.to_string()));
        }

        let dir = self.dir(kind).ok_or(StorageError::KindDisabled(kind))?;
        Ok(dir.join(format!("{}.json", hash)))
    }

    fn lock_for(&self, hash: &str) -> MutexGuard<'_, ()> {
        let stripe = hash
            .bytes()
            .fold(0usize, |acc, b| acc.wrapping_mul(31).wrapping_add(b as usize))
            % LOCK_STRIPES;

        // The guarded value is (), so a poisoned lock carries no broken state
        self.locks[stripe]
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl EntryStore for JsonStore {
    fn get_definitions(&self, hash: &str) -> StorageResult<Option<DictionaryEntry>> {
        let path = self.entry_path(StoreKind::Dictionary, hash)?;
        read_json(&path)
    }

    fn merge_definitions(
        &self,
        hash: &str,
        word: &str,
        definitions: &BTreeSet<String>,
    ) -> StorageResult<MergeOutcome> {
        let path = self.entry_path(StoreKind::Dictionary, hash)?;
        let _guard = self.lock_for(hash);

        let existing = match read_json::<DictionaryEntry>(&path) {
            Ok(entry) => entry,
            Err(StorageError::Corrupt { path, source }) => {
                tracing::warn!(
                    "Treating corrupt entry {} as empty: {}",
                    path.display(),
                    source
                );
                None
            }
            Err(e) => return Err(e),
        };

        match existing {
            None => {
                let entry = DictionaryEntry {
                    word: word.to_string(),
                    definitions: definitions.clone(),
                };
                write_json_atomic(&path, &entry)?;
                Ok(MergeOutcome::Created)
            }
            Some(mut entry) => {
                let before = entry.definitions.len();
                entry.definitions.extend(definitions.iter().cloned());

                if entry.definitions.len() == before {
                    return Ok(MergeOutcome::Unchanged);
                }

                write_json_atomic(&path, &entry)?;
                Ok(MergeOutcome::Updated)
            }
        }
    }

    fn get_paradigm(&self, hash: &str) -> StorageResult<Option<ParadigmEntry>> {
        let path = self.entry_path(StoreKind::Paradigm, hash)?;
        read_json(&path)
    }

    fn put_paradigm_if_absent(&self, hash: &str, entry: &ParadigmEntry) -> StorageResult<bool> {
        let path = self.entry_path(StoreKind::Paradigm, hash)?;
        let _guard = self.lock_for(hash);

        match read_json::<ParadigmEntry>(&path) {
            Ok(Some(_)) => return Ok(false),
            Ok(None) => {}
            Err(StorageError::Corrupt { path, source }) => {
                tracing::warn!(
                    "Replacing corrupt paradigm entry {}: {}",
                    path.display(),
                    source
                );
            }
            Err(e) => return Err(e),
        }

        write_json_atomic(&path, entry)?;
        Ok(true)
    }
}

/// Reads and parses a JSON file
///
/// # Returns
///
/// * `Ok(None)` - The file does not exist
/// * `Err(StorageError::Corrupt)` - The file exists but does not parse
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> StorageResult<Option<T>> {
    let data = match fs::read(path) {
        Ok(data) => data,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    serde_json::from_slice(&data)
        .map(Some)
        .map_err(|source| StorageError::Corrupt {
            path: path.to_path_buf(),
            source,
        })
}

/// Serializes a value next to `path` and renames it into place
pub(crate) fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> StorageResult<()> {
    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let temp_file = NamedTempFile::new_in(parent)?;
    {
        let mut writer = BufWriter::new(temp_file.as_file());
        serde_json::to_writer_pretty(&mut writer, value)?;
        writer.flush()?;
    }

    temp_file.persist(path).map_err(|e| e.error)?;
    Ok(())
}
