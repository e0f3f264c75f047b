//! Crawl and store statistics
//!
//! This module provides the counters shared by all workers during a run and
//! the summary of an existing store used by `--stats`.

use crate::config::Config;
use crate::storage::{DictionaryEntry, MergeOutcome, StorageError, StorageResult, TitleIndex};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters updated by every worker without locking
#[derive(Debug, Default)]
pub struct CrawlStats {
    items_processed: AtomicU64,
    items_skipped: AtomicU64,
    items_abandoned: AtomicU64,
    http_errors: AtomicU64,
    retries: AtomicU64,
    malformed_ids: AtomicU64,
    entries_created: AtomicU64,
    entries_updated: AtomicU64,
    entries_unchanged: AtomicU64,
    paradigms_written: AtomicU64,
    paradigms_abandoned: AtomicU64,
    store_errors: AtomicU64,
}

impl CrawlStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_processed(&self) {
        self.items_processed.fetch_add(1, Ordering::Relaxed);
    }

    /// An item page did not have the expected shape
    pub fn record_skipped(&self) {
        self.items_skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// An item was dropped after exhausting its attempts
    pub fn record_abandoned(&self) {
        self.items_abandoned.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_http_error(&self) {
        self.http_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_retries(&self, retries: u32) {
        self.retries.fetch_add(u64::from(retries), Ordering::Relaxed);
    }

    pub fn record_malformed_id(&self) {
        self.malformed_ids.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_merge(&self, outcome: MergeOutcome) {
        let counter = match outcome {
            MergeOutcome::Created => &self.entries_created,
            MergeOutcome::Updated => &self.entries_updated,
            MergeOutcome::Unchanged => &self.entries_unchanged,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_paradigm_written(&self) {
        self.paradigms_written.fetch_add(1, Ordering::Relaxed);
    }

    /// A paradigm page was dropped after exhausting its attempts
    pub fn record_paradigm_abandoned(&self) {
        self.paradigms_abandoned.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_store_error(&self) {
        self.store_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Copies the current counter values
    pub fn snapshot(&self) -> CrawlStatistics {
        CrawlStatistics {
            items_processed: self.items_processed.load(Ordering::Relaxed),
            items_skipped: self.items_skipped.load(Ordering::Relaxed),
            items_abandoned: self.items_abandoned.load(Ordering::Relaxed),
            http_errors: self.http_errors.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
            malformed_ids: self.malformed_ids.load(Ordering::Relaxed),
            entries_created: self.entries_created.load(Ordering::Relaxed),
            entries_updated: self.entries_updated.load(Ordering::Relaxed),
            entries_unchanged: self.entries_unchanged.load(Ordering::Relaxed),
            paradigms_written: self.paradigms_written.load(Ordering::Relaxed),
            paradigms_abandoned: self.paradigms_abandoned.load(Ordering::Relaxed),
            store_errors: self.store_errors.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of the run counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlStatistics {
    /// Item pages parsed and merged
    pub items_processed: u64,

    /// Item pages without the expected blocks
    pub items_skipped: u64,

    /// Items dropped after exhausting their attempts
    pub items_abandoned: u64,

    /// Item or paradigm requests answered with a non-success status
    pub http_errors: u64,

    /// Attempts beyond the first, across all requests
    pub retries: u64,

    /// Identifier blocks that did not hold an integer
    pub malformed_ids: u64,

    pub entries_created: u64,
    pub entries_updated: u64,
    pub entries_unchanged: u64,
    pub paradigms_written: u64,

    /// Paradigm pages dropped after exhausting their attempts
    pub paradigms_abandoned: u64,

    /// Store reads or writes that failed
    pub store_errors: u64,
}

impl CrawlStatistics {
    /// Logs the run summary
    pub fn log(&self) {
        tracing::info!(
            "Items: {} processed, {} skipped, {} abandoned, {} HTTP errors, {} retries",
            self.items_processed,
            self.items_skipped,
            self.items_abandoned,
            self.http_errors,
            self.retries
        );
        tracing::info!(
            "Entries: {} created, {} updated, {} unchanged; {} paradigms written, {} abandoned",
            self.entries_created,
            self.entries_updated,
            self.entries_unchanged,
            self.paradigms_written,
            self.paradigms_abandoned
        );

        if self.store_errors > 0 || self.malformed_ids > 0 {
            tracing::warn!(
                "{} store errors, {} malformed orthography ids",
                self.store_errors,
                self.malformed_ids
            );
        }
    }
}

/// Summary of what an existing store holds
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreStatistics {
    /// Dictionary entry files
    pub dictionary_entries: u64,

    /// Definitions across all dictionary entries
    pub total_definitions: u64,

    /// Paradigm entry files
    pub paradigm_entries: u64,

    /// Hashes recorded in the title index
    pub indexed_titles: u64,

    /// Dictionary entry files that do not parse
    pub corrupt_entries: u64,
}

/// Scans the output locations of a configuration
///
/// # Returns
///
/// * `Ok(StoreStatistics)` - Successfully scanned the store
/// * `Err(StorageError)` - A directory could not be read
pub fn load_statistics(config: &Config) -> StorageResult<StoreStatistics> {
    let mut stats = StoreStatistics::default();

    for path in json_files(Path::new(&config.output.dictionary_dir))? {
        let parsed = fs::read(&path)
            .map_err(StorageError::from)
            .and_then(|data| serde_json::from_slice::<DictionaryEntry>(&data).map_err(Into::into));

        match parsed {
            Ok(entry) => {
                stats.dictionary_entries += 1;
                stats.total_definitions += entry.definitions.len() as u64;
            }
            Err(e) => {
                tracing::debug!("Unreadable entry {}: {}", path.display(), e);
                stats.corrupt_entries += 1;
            }
        }
    }

    if let Some(dir) = &config.output.paradigm_dir {
        stats.paradigm_entries = json_files(Path::new(dir))?.len() as u64;
    }

    stats.indexed_titles = TitleIndex::load(Path::new(&config.output.index_path))?.len() as u64;

    Ok(stats)
}

fn json_files(dir: &Path) -> StorageResult<Vec<std::path::PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    Ok(files)
}

/// Prints store statistics to stdout in a formatted manner
pub fn print_statistics(stats: &StoreStatistics) {
    println!("=== Store Statistics ===\n");

    println!("Dictionary:");
    println!("  Entries: {}", stats.dictionary_entries);
    println!("  Definitions: {}", stats.total_definitions);
    if stats.dictionary_entries > 0 {
        println!(
            "  Definitions per entry: {:.2}",
            stats.total_definitions as f64 / stats.dictionary_entries as f64
        );
    }
    if stats.corrupt_entries > 0 {
        println!("  Corrupt entries: {}", stats.corrupt_entries);
    }
    println!();

    println!("Paradigms: {}", stats.paradigm_entries);
    println!("Indexed titles: {}", stats.indexed_titles);
}
