//! Fetching and parsing of item and paradigm pages

use crate::crawler::fetcher::{FetchResult, Fetcher};
use crate::crawler::parser::{parse_paradigm_page, parse_word_page, ParadigmRecord, ParsedWord};
use url::Url;

/// A fetched page turned into a record, or why there is none
#[derive(Debug)]
pub enum Fetched<T> {
    Parsed {
        record: T,
        /// Attempts spent, including the successful one
        attempts: u32,
    },
    HttpError {
        status_code: u16,
    },
    GaveUp {
        attempts: u32,
        error: String,
    },
}

impl<T> Fetched<T> {
    /// Number of attempts beyond the first
    pub fn retries(&self) -> u32 {
        match self {
            Self::Parsed { attempts, .. } | Self::GaveUp { attempts, .. } => {
                attempts.saturating_sub(1)
            }
            Self::HttpError { .. } => 0,
        }
    }
}

/// Fetches one definition page and parses its word record
///
/// A page in an unexpected shape comes back as `Parsed` with an empty
/// record; the caller decides to skip it.
pub async fn fetch_word(fetcher: &Fetcher, item_url: &Url) -> Fetched<ParsedWord> {
    fetch_parsed(fetcher, item_url, parse_word_page).await
}

/// Fetches the inflection tables of one entry
pub async fn fetch_paradigm(fetcher: &Fetcher, paradigm_url: &Url) -> Fetched<ParadigmRecord> {
    fetch_parsed(fetcher, paradigm_url, parse_paradigm_page).await
}

async fn fetch_parsed<T>(fetcher: &Fetcher, url: &Url, parse: fn(&str) -> T) -> Fetched<T> {
    match fetcher.fetch(url.as_str()).await {
        FetchResult::Success { body, attempts, .. } => Fetched::Parsed {
            record: parse(&body),
            attempts,
        },
        FetchResult::HttpError { status_code } => Fetched::HttpError { status_code },
        FetchResult::GaveUp { attempts, error } => Fetched::GaveUp { attempts, error },
    }
}
