//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the shared HTTP client with a proper user agent string
//! - The politeness delay before each request
//! - Bounded retry of connection-level failures
//! - Error classification

use crate::config::{Config, UserAgentConfig};
use reqwest::Client;
use std::time::Duration;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched the page
    Success {
        /// Page body content
        body: String,
        /// Attempts spent, including the successful one
        attempts: u32,
    },

    /// The server answered with a non-success status; never retried
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Every attempt failed at the network layer, or the failure was permanent
    GaveUp {
        /// Attempts spent before giving up
        attempts: u32,
        /// Description of the last error
        error: String,
    },
}

impl FetchResult {
    /// Number of attempts beyond the first
    pub fn retries(&self) -> u32 {
        match self {
            Self::Success { attempts, .. } | Self::GaveUp { attempts, .. } => {
                attempts.saturating_sub(1)
            }
            Self::HttpError { .. } => 0,
        }
    }
}

/// How many times a URL is tried and how long to wait in between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per URL (at least one)
    pub max_attempts: u32,
    /// Pause between attempts; zero retries immediately
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    /// Whether another attempt is allowed after `attempt` failed
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout` - Whole-request timeout
///
/// # Example
///
/// ```no_run
/// use lexicon_ripple::config::UserAgentConfig;
/// use lexicon_ripple::crawler::build_http_client;
/// use std::time::Duration;
///
/// let config = UserAgentConfig {
///     crawler_name: "LexiconRipple".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config, Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    // Format: CrawlerName/Version (+ContactURL; ContactEmail)
    let user_agent = format!(
        "{}/{} (+{}; {})",
        config.crawler_name, config.crawler_version, config.contact_url, config.contact_email
    );

    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches pages through one shared client with retry and throttling
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    retry: RetryPolicy,
    request_delay: Duration,
}

impl Fetcher {
    pub fn new(client: Client, retry: RetryPolicy, request_delay: Duration) -> Self {
        Self {
            client,
            retry,
            request_delay,
        }
    }

    /// Builds the client and policies from the crawl configuration
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let client = build_http_client(
            &config.user_agent,
            Duration::from_secs(config.crawler.request_timeout_secs),
        )?;

        Ok(Self::new(
            client,
            RetryPolicy::new(
                config.crawler.max_attempts,
                Duration::from_millis(config.crawler.retry_backoff_ms),
            ),
            Duration::from_millis(config.crawler.request_delay_ms),
        ))
    }

    /// Fetches a URL, retrying connection-level failures
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | 2xx | Return the body |
    /// | Other HTTP status | Immediate HttpError |
    /// | Connect/timeout/transfer failure | Retry until `max_attempts`, then GaveUp |
    /// | Any other client error | Immediate GaveUp |
    pub async fn fetch(&self, url: &str) -> FetchResult {
        let mut attempt = 0;

        loop {
            attempt += 1;

            if !self.request_delay.is_zero() {
                tokio::time::sleep(self.request_delay).await;
            }

            let error = match self.fetch_once(url).await {
                Ok(Ok(body)) => {
                    return FetchResult::Success {
                        body,
                        attempts: attempt,
                    };
                }
                Ok(Err(status_code)) => return FetchResult::HttpError { status_code },
                Err(e) => e,
            };

            if !is_transient(&error) {
                return FetchResult::GaveUp {
                    attempts: attempt,
                    error: error.to_string(),
                };
            }

            if !self.retry.should_retry(attempt) {
                tracing::warn!(
                    "Giving up on {} after {} attempts: {}",
                    url,
                    attempt,
                    error
                );
                return FetchResult::GaveUp {
                    attempts: attempt,
                    error: error.to_string(),
                };
            }

            tracing::debug!(
                "Attempt {}/{} for {} failed: {}",
                attempt,
                self.retry.max_attempts,
                url,
                error
            );

            if !self.retry.backoff.is_zero() {
                tokio::time::sleep(self.retry.backoff).await;
            }
        }
    }

    /// One GET; the inner `Err` carries a non-success status code
    async fn fetch_once(
        &self,
        url: &str,
    ) -> Result<Result<String, u16>, reqwest::Error> {
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Ok(Err(status.as_u16()));
        }

        let body = response.text().await?;
        Ok(Ok(body))
    }
}

/// Whether an error is a network-layer failure worth retrying
fn is_transient(error: &reqwest::Error) -> bool {
    error.is_connect() || error.is_timeout() || error.is_request() || error.is_body()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config() -> UserAgentConfig {
        UserAgentConfig {
            crawler_name: "TestCrawler".to_string(),
            crawler_version: "1.0".to_string(),
            contact_url: "https://example.com/about".to_string(),
            contact_email: "admin@example.com".to_string(),
        }
    }

    fn test_fetcher(max_attempts: u32) -> Fetcher {
        let client = build_http_client(&create_test_config(), Duration::from_secs(2)).unwrap();
        Fetcher::new(
            client,
            RetryPolicy::new(max_attempts, Duration::ZERO),
            Duration::ZERO,
        )
    }

    #[test]
    fn test_build_http_client() {
        let client = build_http_client(&create_test_config(), Duration::from_secs(30));
        assert!(client.is_ok());
    }

    #[test]
    fn test_retry_policy_bounds() {
        let policy = RetryPolicy::new(3, Duration::ZERO);
        assert!(policy.should_retry(1));
        assert!(policy.should_retry(2));
        assert!(!policy.should_retry(3));

        let clamped = RetryPolicy::new(0, Duration::ZERO);
        assert_eq!(clamped.max_attempts, 1);
        assert!(!clamped.should_retry(1));
    }

    #[test]
    fn test_retries_count() {
        let gave_up = FetchResult::GaveUp {
            attempts: 4,
            error: "refused".to_string(),
        };
        assert_eq!(gave_up.retries(), 3);
        assert_eq!(FetchResult::HttpError { status_code: 404 }.retries(), 0);
    }

    #[tokio::test]
    async fn test_connection_refused_gives_up_after_max_attempts() {
        // Bind then drop a listener so the port is closed
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let fetcher = test_fetcher(3);
        let result = fetcher.fetch(&format!("http://{}/definition.php", addr)).await;

        match result {
            FetchResult::GaveUp { attempts, .. } => assert_eq!(attempts, 3),
            other => panic!("expected GaveUp, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_invalid_url_is_not_retried() {
        let fetcher = test_fetcher(5);
        let result = fetcher.fetch("not a url").await;

        match result {
            FetchResult::GaveUp { attempts, .. } => assert_eq!(attempts, 1),
            other => panic!("expected GaveUp, got {:?}", other),
        }
    }
}
