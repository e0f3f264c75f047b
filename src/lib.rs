//! Lexicon-Ripple: a concurrent dictionary harvester
//!
//! This crate crawls a paginated word-listing site, fetches each entry's
//! definition (and optionally inflection-table) page, normalizes the scraped
//! text and merges it into a content-addressed on-disk store keyed by a hash
//! of each title.

pub mod config;
pub mod crawler;
pub mod output;
pub mod site;
pub mod storage;
pub mod text;

use thiserror::Error;

/// Main error type for Lexicon-Ripple operations
#[derive(Debug, Error)]
pub enum LexiconError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Lexicon-Ripple operations
pub type Result<T> = std::result::Result<T, LexiconError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{run_crawl, CrawlOptions, CrawlReport};
pub use storage::{title_hash, JsonStore, MergeOutcome, TitleIndex};
pub use text::{normalize_definition, normalize_title};
