//! Lexicon-Ripple main entry point
//!
//! This is the command-line interface for the Lexicon-Ripple dictionary harvester.

use anyhow::Context;
use clap::Parser;
use lexicon_ripple::config::{load_config_with_hash, Config};
use lexicon_ripple::crawler::{run_crawl, CrawlOptions};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Lexicon-Ripple: a concurrent dictionary harvester
///
/// Lexicon-Ripple crawls a word-listing site with a fixed pool of workers,
/// normalizes every entry's titles and definitions, and merges them into a
/// content-addressed store on disk.
#[derive(Parser, Debug)]
#[command(name = "lexicon-ripple")]
#[command(version = "1.0.0")]
#[command(about = "A concurrent dictionary harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Rediscover item links even when the link cache holds them
    #[arg(long)]
    fresh: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics of the existing store and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_crawl(config, cli.fresh).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("lexicon_ripple=info,warn"),
            1 => EnvFilter::new("lexicon_ripple=debug,info"),
            2 => EnvFilter::new("lexicon_ripple=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the validated crawl plan
fn handle_dry_run(config: &Config) {
    println!("=== Lexicon-Ripple Dry Run ===\n");

    println!("Site:");
    println!("  Base URL: {}", config.site.base_url);
    println!(
        "  Listing: {}?{}=<page>",
        config.site.listing_path, config.site.page_param
    );
    println!("  Pages ({}): {}", config.site.pages.len(), config.site.pages.join(" "));
    if let Some(subset) = &config.site.subset {
        println!("  Subset: {}={}", config.site.subset_param, subset);
    }
    println!("  Item marker: {}", config.site.item_marker);
    match &config.site.paradigm_path {
        Some(path) => println!("  Paradigms: {}?{}=<id>", path, config.site.paradigm_param),
        None => println!("  Paradigms: disabled"),
    }

    println!("\nCrawler:");
    println!("  Workers: {}", config.crawler.workers);
    println!("  Max attempts: {}", config.crawler.max_attempts);
    println!("  Retry backoff: {}ms", config.crawler.retry_backoff_ms);
    println!("  Request delay: {}ms", config.crawler.request_delay_ms);
    println!("  Progress interval: {} items", config.crawler.progress_interval);

    println!("\nUser Agent:");
    println!("  Name: {}", config.user_agent.crawler_name);
    println!("  Version: {}", config.user_agent.crawler_version);
    println!("  Contact URL: {}", config.user_agent.contact_url);
    println!("  Contact Email: {}", config.user_agent.contact_email);

    println!("\nOutput:");
    println!("  Dictionary: {}", config.output.dictionary_dir);
    if let Some(dir) = &config.output.paradigm_dir {
        println!("  Paradigms: {}", dir);
    }
    println!("  Index: {}", config.output.index_path);
    if let Some(path) = &config.output.link_cache_path {
        println!("  Link cache: {}", path);
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode: summarizes the existing store
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    use lexicon_ripple::output::{load_statistics, print_statistics};

    let stats = load_statistics(config).context("failed to scan the store")?;
    print_statistics(&stats);
    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, fresh: bool) -> anyhow::Result<()> {
    if fresh {
        tracing::info!("Starting fresh crawl (ignoring cached links)");
    }

    tracing::info!(
        "Listing pages: {}, workers: {}",
        config.site.pages.len(),
        config.crawler.workers
    );

    let report = run_crawl(config, CrawlOptions { fresh })
        .await
        .context("crawl failed")?;

    tracing::info!(
        "Crawl finished: {} links, {} titles indexed in {:?}",
        report.links,
        report.indexed_titles,
        report.elapsed
    );

    if report.failed_workers > 0 {
        tracing::warn!("{} workers did not complete", report.failed_workers);
    }

    Ok(())
}
