use crate::config::SiteConfig;
use crate::LexiconError;
use url::Url;

/// Link-cache key used when no dictionary subset is configured
pub const ALL_SUBSETS_KEY: &str = "all";

/// Resolved endpoints of the remote dictionary site
#[derive(Debug, Clone)]
pub struct Endpoints {
    base: Url,
    listing_path: String,
    page_param: String,
    subset: Option<(String, String)>,
    item_marker: String,
    paradigm: Option<(String, String)>,
}

impl Endpoints {
    /// Parses the base URL and captures the site layout
    ///
    /// A base URL whose path does not end in `/` is treated as a directory,
    /// so relative paths resolve beneath it.
    pub fn from_config(config: &SiteConfig) -> Result<Self, LexiconError> {
        let mut base = Url::parse(&config.base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        Ok(Self {
            base,
            listing_path: config.listing_path.clone(),
            page_param: config.page_param.clone(),
            subset: config
                .subset
                .clone()
                .map(|subset| (config.subset_param.clone(), subset)),
            item_marker: config.item_marker.clone(),
            paradigm: config
                .paradigm_path
                .clone()
                .map(|path| (path, config.paradigm_param.clone())),
        })
    }

    /// URL of one listing page, with the subset selector when configured
    pub fn listing_url(&self, page: &str) -> Result<Url, LexiconError> {
        let mut url = self.base.join(&self.listing_path)?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair(&self.page_param, page);
            if let Some((param, subset)) = &self.subset {
                query.append_pair(param, subset);
            }
        }
        Ok(url)
    }

    /// Resolves a relative item link against the base URL
    pub fn item_url(&self, link: &str) -> Result<Url, LexiconError> {
        Ok(self.base.join(link.trim())?)
    }

    /// URL of the inflection tables for an orthography id
    ///
    /// Returns `Ok(None)` when the site has no paradigm endpoint configured.
    pub fn paradigm_url(&self, orthography_id: u64) -> Result<Option<Url>, LexiconError> {
        let Some((path, param)) = &self.paradigm else {
            return Ok(None);
        };

        let mut url = self.base.join(path)?;
        url.query_pairs_mut()
            .append_pair(param, &orthography_id.to_string());
        Ok(Some(url))
    }

    /// Whether an href points at an item-detail page
    pub fn is_item_link(&self, href: &str) -> bool {
        href.contains(&self.item_marker)
    }

    /// Key under which this configuration's links are cached
    pub fn subset_key(&self) -> &str {
        self.subset
            .as_ref()
            .map(|(_, subset)| subset.as_str())
            .unwrap_or(ALL_SUBSETS_KEY)
    }
}
