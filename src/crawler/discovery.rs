//! Link discovery over the listing pages

use crate::crawler::fetcher::{FetchResult, Fetcher};
use crate::crawler::parser::extract_item_links;
use crate::site::Endpoints;
use std::collections::BTreeSet;
use std::time::Instant;
use url::Url;

/// Item links found over a set of listing pages
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Discovery {
    pub links: BTreeSet<String>,

    /// Listing pages that could not be fetched
    pub failed_pages: usize,
}

impl Discovery {
    /// Whether every listing page was fetched
    pub fn is_complete(&self) -> bool {
        self.failed_pages == 0
    }
}

/// Fetches one listing page and returns the item links on it
///
/// Failures are logged and yield `None`; a gap in one listing never stops
/// the crawl.
pub async fn discover(
    fetcher: &Fetcher,
    endpoints: &Endpoints,
    listing_url: &Url,
) -> Option<BTreeSet<String>> {
    match fetcher.fetch(listing_url.as_str()).await {
        FetchResult::Success { body, .. } => Some(extract_item_links(&body, endpoints)),
        FetchResult::HttpError { status_code } => {
            tracing::warn!("Listing {} returned HTTP {}", listing_url, status_code);
            None
        }
        FetchResult::GaveUp { attempts, error } => {
            tracing::warn!(
                "Skipping listing {} after {} attempts: {}",
                listing_url,
                attempts,
                error
            );
            None
        }
    }
}

/// Discovers the item links of every configured listing page
///
/// Pages are visited in order; the union is deduplicated by exact string.
/// Pages that fail are counted in `failed_pages`.
pub async fn discover_all(fetcher: &Fetcher, endpoints: &Endpoints, pages: &[String]) -> Discovery {
    let mut discovery = Discovery::default();

    for page in pages {
        let listing_url = match endpoints.listing_url(page) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("Cannot build listing URL for page {:?}: {}", page, e);
                discovery.failed_pages += 1;
                continue;
            }
        };

        let started = Instant::now();
        match discover(fetcher, endpoints, &listing_url).await {
            Some(found) => {
                tracing::info!(
                    "Listing page {:?}: {} links in {:?}",
                    page,
                    found.len(),
                    started.elapsed()
                );
                discovery.links.extend(found);
            }
            None => discovery.failed_pages += 1,
        }
    }

    discovery
}
