//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the run loop that coordinates the whole harvest:
//! - Opening the store and loading the title index
//! - Discovering item links, or reusing cached ones
//! - Partitioning links across a fixed pool of workers
//! - Driving each worker's fetch -> parse -> merge loop
//! - Flushing the title index once every worker is done

use crate::config::{validate, Config};
use crate::crawler::discovery::discover_all;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::item::{fetch_paradigm, fetch_word, Fetched};
use crate::crawler::parser::ParadigmRecord;
use crate::crawler::partition::{estimate_remaining, partition};
use crate::output::{CrawlStatistics, CrawlStats};
use crate::site::Endpoints;
use crate::storage::{title_hash, EntryStore, JsonStore, LinkCache, ParadigmEntry, TitleIndex};
use crate::Result;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;

/// Run-level switches that are not part of the configuration file
#[derive(Debug, Clone, Copy, Default)]
pub struct CrawlOptions {
    /// Rediscover links even when the link cache holds them
    pub fresh: bool,
}

/// What a finished run did
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Distinct item links crawled
    pub links: usize,

    /// Hashes in the title index after the flush
    pub indexed_titles: usize,

    /// Workers whose task failed to complete
    pub failed_workers: usize,

    pub statistics: CrawlStatistics,
    pub elapsed: Duration,
}

/// State shared by every worker of one run
struct WorkerContext {
    fetcher: Fetcher,
    endpoints: Endpoints,
    store: Arc<dyn EntryStore>,
    index: Arc<TitleIndex>,
    stats: Arc<CrawlStats>,
    paradigms: bool,
    progress_interval: usize,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Arc<Config>,
    options: CrawlOptions,
    context: Arc<WorkerContext>,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// Every setup step that can fail happens here, before any worker
    /// starts: validating the configuration, resolving endpoints, building
    /// the HTTP client, creating the output directories and loading the
    /// title index.
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(LexiconError)` - Failed to initialize
    pub fn new(config: Config, options: CrawlOptions) -> Result<Self> {
        validate(&config)?;

        let endpoints = Endpoints::from_config(&config.site)?;
        let fetcher = Fetcher::from_config(&config)?;

        let paradigms = config.paradigms_enabled();
        let paradigm_dir = if paradigms {
            config.output.paradigm_dir.as_deref().map(Path::new)
        } else {
            None
        };
        let store = JsonStore::open(Path::new(&config.output.dictionary_dir), paradigm_dir)?;

        let index = TitleIndex::load(Path::new(&config.output.index_path))?;
        if !index.is_empty() {
            tracing::info!("Loaded {} titles from the existing index", index.len());
        }

        let context = WorkerContext {
            fetcher,
            endpoints,
            store: Arc::new(store),
            index: Arc::new(index),
            stats: Arc::new(CrawlStats::new()),
            paradigms,
            progress_interval: config.crawler.progress_interval,
        };

        Ok(Self {
            config: Arc::new(config),
            options,
            context: Arc::new(context),
        })
    }

    /// Runs the crawl to completion
    ///
    /// 1. Collect item links (link cache or discovery)
    /// 2. Partition them into one slice per worker
    /// 3. Run every worker over its slice
    /// 4. Flush the title index once
    pub async fn run(&self) -> Result<CrawlReport> {
        let start_time = Instant::now();

        let links = self.collect_links().await?;
        let link_count = links.len();
        let workers = self.config.crawler.workers;
        tracing::info!("Crawling {} item links with {} workers", link_count, workers);

        let mut tasks = JoinSet::new();
        for (worker_id, slice) in partition(links, workers).into_iter().enumerate() {
            if slice.is_empty() {
                continue;
            }
            let context = Arc::clone(&self.context);
            tasks.spawn(run_worker(context, worker_id, slice));
        }

        let mut failed_workers = 0;
        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                tracing::error!("Worker task failed: {}", e);
                failed_workers += 1;
            }
        }

        let index_path = Path::new(&self.config.output.index_path);
        self.context.index.flush(index_path)?;
        tracing::info!(
            "Wrote {} titles to {}",
            self.context.index.len(),
            index_path.display()
        );

        let statistics = self.context.stats.snapshot();
        statistics.log();

        let elapsed = start_time.elapsed();
        tracing::info!("Crawl completed: {} links in {:?}", link_count, elapsed);

        Ok(CrawlReport {
            links: link_count,
            indexed_titles: self.context.index.len(),
            failed_workers,
            statistics,
            elapsed,
        })
    }

    /// Item links for this run, deduplicated
    ///
    /// Cached links are used unless the run is fresh or the cache holds no
    /// links for the current subset. Discovered links are written back only
    /// when every listing page was fetched, so a failed page is retried on
    /// the next run.
    async fn collect_links(&self) -> Result<Vec<String>> {
        let key = self.context.endpoints.subset_key().to_string();
        let cache_path = self.config.output.link_cache_path.as_ref().map(PathBuf::from);

        let mut cache = match &cache_path {
            Some(path) => Some(LinkCache::load(path)?),
            None => None,
        };

        if !self.options.fresh {
            let cached = cache
                .as_ref()
                .and_then(|c| c.get(&key))
                .filter(|links| !links.is_empty());
            if let Some(cached) = cached {
                let links: BTreeSet<String> = cached.iter().cloned().collect();
                tracing::info!("Using {} cached links for subset {:?}", links.len(), key);
                return Ok(links.into_iter().collect());
            }
        }

        let discovery = discover_all(
            &self.context.fetcher,
            &self.context.endpoints,
            &self.config.site.pages,
        )
        .await;
        let complete = discovery.is_complete();
        let links: Vec<String> = discovery.links.into_iter().collect();

        if !complete {
            tracing::warn!(
                "{} listing pages failed; not caching links for subset {:?}",
                discovery.failed_pages,
                key
            );
        } else if let Some(cache) = cache.as_mut() {
            cache.insert(&key, links.clone());
            cache.save()?;
        }

        Ok(links)
    }
}

/// Processes one slice of links, in order
async fn run_worker(context: Arc<WorkerContext>, worker_id: usize, links: Vec<String>) {
    let started = Instant::now();
    let total = links.len();
    tracing::debug!("Worker {} starting on {} links", worker_id, total);

    for (i, link) in links.iter().enumerate() {
        process_item(&context, link).await;

        let done = i + 1;
        if done % context.progress_interval == 0 && done < total {
            let elapsed = started.elapsed();
            tracing::info!(
                "Worker {}: {}/{} items, elapsed {:?}, ETA {:?}",
                worker_id,
                done,
                total,
                elapsed,
                estimate_remaining(elapsed, done, total)
            );
        }
    }

    tracing::info!(
        "Worker {} finished {} items in {:?}",
        worker_id,
        total,
        started.elapsed()
    );
}

/// Fetches, parses and merges one item
///
/// Every failure is contained here: it is logged, counted, and the worker
/// moves on to its next link.
async fn process_item(context: &WorkerContext, link: &str) {
    let url = match context.endpoints.item_url(link) {
        Ok(url) => url,
        Err(e) => {
            tracing::warn!("Skipping unresolvable link {:?}: {}", link, e);
            context.stats.record_abandoned();
            return;
        }
    };

    let fetched = fetch_word(&context.fetcher, &url).await;
    context.stats.record_retries(fetched.retries());
    let parsed = match fetched {
        Fetched::Parsed { record, .. } => record,
        Fetched::HttpError { status_code } => {
            tracing::warn!("Item {} returned HTTP {}", url, status_code);
            context.stats.record_http_error();
            return;
        }
        Fetched::GaveUp { attempts, error } => {
            tracing::warn!("Abandoning {} after {} attempts: {}", url, attempts, error);
            context.stats.record_abandoned();
            return;
        }
    };

    if let Some(raw) = &parsed.malformed_id {
        tracing::warn!("Malformed orthography id {:?} on {}", raw, url);
        context.stats.record_malformed_id();
    }

    let record = parsed.record;
    if record.is_empty() {
        tracing::debug!("No entry on {}", url);
        context.stats.record_skipped();
        return;
    }

    let paradigm = match (context.paradigms, record.orthography_id) {
        (true, Some(id)) => paradigm_for(context, id).await,
        _ => None,
    };

    for title in &record.titles {
        let hash = title_hash(title);
        context.index.insert_if_absent(&hash, title);

        merge_definitions(context, &hash, title, &record.definitions).await;

        if let Some(paradigm) = &paradigm {
            let entry = ParadigmEntry {
                word: title.clone(),
                forms: paradigm.forms,
                tables: paradigm.tables.clone(),
            };
            store_paradigm(context, &hash, entry).await;
        }
    }

    tracing::debug!("Merged {} titles from {}", record.titles.len(), url);
    context.stats.record_processed();
}

async fn paradigm_for(context: &WorkerContext, orthography_id: u64) -> Option<ParadigmRecord> {
    let url = match context.endpoints.paradigm_url(orthography_id) {
        Ok(Some(url)) => url,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!("Cannot build paradigm URL for {}: {}", orthography_id, e);
            return None;
        }
    };

    let fetched = fetch_paradigm(&context.fetcher, &url).await;
    context.stats.record_retries(fetched.retries());
    match fetched {
        Fetched::Parsed { record, .. } => Some(record),
        Fetched::HttpError { status_code } => {
            tracing::warn!("Paradigm {} returned HTTP {}", url, status_code);
            context.stats.record_http_error();
            None
        }
        Fetched::GaveUp { attempts, error } => {
            tracing::warn!(
                "Abandoning paradigm {} after {} attempts: {}",
                url,
                attempts,
                error
            );
            context.stats.record_paradigm_abandoned();
            None
        }
    }
}

async fn merge_definitions(
    context: &WorkerContext,
    hash: &str,
    word: &str,
    definitions: &BTreeSet<String>,
) {
    let store = Arc::clone(&context.store);
    let (owned_hash, owned_word, owned_definitions) =
        (hash.to_string(), word.to_string(), definitions.clone());

    let result = tokio::task::spawn_blocking(move || {
        store.merge_definitions(&owned_hash, &owned_word, &owned_definitions)
    })
    .await;

    match result {
        Ok(Ok(outcome)) => context.stats.record_merge(outcome),
        Ok(Err(e)) => {
            tracing::warn!("Failed to merge {:?} ({}): {}", word, hash, e);
            context.stats.record_store_error();
        }
        Err(e) => {
            tracing::warn!("Merge task for {:?} failed: {}", word, e);
            context.stats.record_store_error();
        }
    }
}

async fn store_paradigm(context: &WorkerContext, hash: &str, entry: ParadigmEntry) {
    let store = Arc::clone(&context.store);
    let owned_hash = hash.to_string();

    let result =
        tokio::task::spawn_blocking(move || store.put_paradigm_if_absent(&owned_hash, &entry))
            .await;

    match result {
        Ok(Ok(true)) => context.stats.record_paradigm_written(),
        Ok(Ok(false)) => {}
        Ok(Err(e)) => {
            tracing::warn!("Failed to store paradigm {}: {}", hash, e);
            context.stats.record_store_error();
        }
        Err(e) => {
            tracing::warn!("Paradigm task for {} failed: {}", hash, e);
            context.stats.record_store_error();
        }
    }
}

/// Runs a complete crawl with the given options
///
/// # Example
///
/// ```no_run
/// use lexicon_ripple::config::load_config;
/// use lexicon_ripple::crawler::{run_crawl, CrawlOptions};
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("config.toml"))?;
/// let report = run_crawl(config, CrawlOptions::default()).await?;
/// println!("{} links crawled", report.links);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config, options: CrawlOptions) -> Result<CrawlReport> {
    let coordinator = Coordinator::new(config, options)?;
    coordinator.run().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CrawlerConfig, OutputConfig, SiteConfig, UserAgentConfig};
    use crate::{ConfigError, LexiconError};
    use tempfile::TempDir;

    fn config(dir: &Path) -> Config {
        Config {
            site: SiteConfig {
                base_url: "https://latinlexicon.org/".to_string(),
                listing_path: "browse_latin.php".to_string(),
                page_param: "p1".to_string(),
                pages: vec!["a".to_string()],
                subset: None,
                subset_param: "p2".to_string(),
                item_marker: "definition.php".to_string(),
                paradigm_path: None,
                paradigm_param: "p1".to_string(),
            },
            crawler: CrawlerConfig {
                workers: 2,
                max_attempts: 3,
                retry_backoff_ms: 0,
                request_delay_ms: 0,
                progress_interval: 100,
                request_timeout_secs: 5,
            },
            user_agent: UserAgentConfig {
                crawler_name: "TestCrawler".to_string(),
                crawler_version: "1.0".to_string(),
                contact_url: "https://example.com/about".to_string(),
                contact_email: "admin@example.com".to_string(),
            },
            output: OutputConfig {
                dictionary_dir: dir.join("dictionary").display().to_string(),
                paradigm_dir: None,
                index_path: dir.join("index.json").display().to_string(),
                link_cache_path: None,
            },
        }
    }

    #[test]
    fn test_new_accepts_valid_config() {
        let dir = TempDir::new().unwrap();
        assert!(Coordinator::new(config(dir.path()), CrawlOptions::default()).is_ok());
    }

    #[test]
    fn test_new_rejects_zero_progress_interval() {
        let dir = TempDir::new().unwrap();
        let mut config = config(dir.path());
        config.crawler.progress_interval = 0;

        let result = Coordinator::new(config, CrawlOptions::default());
        assert!(matches!(
            result,
            Err(LexiconError::Config(ConfigError::Validation(_)))
        ));
        // Rejected before any output location is created
        assert!(!dir.path().join("dictionary").exists());
    }

    #[test]
    fn test_new_rejects_unpaired_paradigm_settings() {
        let dir = TempDir::new().unwrap();
        let mut config = config(dir.path());
        config.site.paradigm_path = Some("paradigms.php".to_string());

        assert!(Coordinator::new(config, CrawlOptions::default()).is_err());
    }
}
