//! Crawler module for harvesting dictionary entries
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with bounded retry
//! - Listing, definition and paradigm page parsing
//! - Item and paradigm fetching
//! - Link discovery across the listing pages
//! - Static partitioning of links across workers
//! - Overall crawl coordination

mod coordinator;
mod discovery;
mod fetcher;
mod item;
mod parser;
mod partition;

pub use coordinator::{run_crawl, Coordinator, CrawlOptions, CrawlReport};
pub use discovery::{discover, discover_all, Discovery};
pub use fetcher::{build_http_client, FetchResult, Fetcher, RetryPolicy};
pub use item::{fetch_paradigm, fetch_word, Fetched};
pub use parser::{
    extract_item_links, parse_orthography_id, parse_paradigm_page, parse_word_page,
    ParadigmRecord, ParsedWord, WordRecord,
};
pub use partition::{estimate_remaining, partition};
