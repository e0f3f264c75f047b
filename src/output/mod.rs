//! Output module for run reporting
//!
//! This module handles:
//! - Counting what a crawl run did, shared across workers
//! - Summarizing an existing store for `--stats`

pub mod stats;

pub use stats::{
    load_statistics, print_statistics, CrawlStatistics, CrawlStats, StoreStatistics,
};
