use serde::Deserialize;

/// Main configuration structure for Lexicon-Ripple
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
}

impl Config {
    /// Whether inflection tables are fetched and persisted
    pub fn paradigms_enabled(&self) -> bool {
        self.site.paradigm_path.is_some() && self.output.paradigm_dir.is_some()
    }
}

/// Remote site layout
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SiteConfig {
    /// Base URL every other path is resolved against
    pub base_url: String,

    /// Path of the listing endpoint (e.g. "browse_latin.php")
    pub listing_path: String,

    /// Query parameter carrying the page/letter selector
    #[serde(default = "default_page_param")]
    pub page_param: String,

    /// Listing pages to enumerate, one request each
    #[serde(default = "default_pages")]
    pub pages: Vec<String>,

    /// Optional dictionary-subset selector appended to every listing request
    #[serde(default)]
    pub subset: Option<String>,

    /// Query parameter carrying the subset selector
    #[serde(default = "default_subset_param")]
    pub subset_param: String,

    /// Path fragment that identifies item-detail links on a listing page
    #[serde(default = "default_item_marker")]
    pub item_marker: String,

    /// Path of the inflection-table endpoint; paradigms are skipped when absent
    #[serde(default)]
    pub paradigm_path: Option<String>,

    /// Query parameter carrying the orthography id
    #[serde(default = "default_page_param")]
    pub paradigm_param: String,
}

/// Worker pool and request behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Number of parallel workers, each owning one slice of the links
    pub workers: usize,

    /// Maximum attempts per URL before it is abandoned
    pub max_attempts: u32,

    /// Delay between attempts (milliseconds); zero retries immediately
    #[serde(default)]
    pub retry_backoff_ms: u64,

    /// Politeness delay before every request (milliseconds)
    #[serde(default)]
    pub request_delay_ms: u64,

    /// Items between two progress/ETA log lines, per worker
    #[serde(default = "default_progress_interval")]
    pub progress_interval: usize,

    /// Whole-request timeout (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// Output locations
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Directory of `<title_hash>.json` dictionary entries
    pub dictionary_dir: String,

    /// Directory of `<title_hash>.json` paradigm entries
    #[serde(default)]
    pub paradigm_dir: Option<String>,

    /// Path of the hash -> title index file
    pub index_path: String,

    /// Path of the discovered-links cache
    #[serde(default)]
    pub link_cache_path: Option<String>,
}

fn default_page_param() -> String {
    "p1".to_string()
}

fn default_subset_param() -> String {
    "p2".to_string()
}

fn default_item_marker() -> String {
    "definition.php".to_string()
}

fn default_pages() -> Vec<String> {
    ('a'..='z').map(|c| c.to_string()).collect()
}

fn default_progress_interval() -> usize {
    100
}

fn default_request_timeout() -> u64 {
    30
}
