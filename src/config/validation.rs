use crate::config::types::{Config, CrawlerConfig, OutputConfig, SiteConfig, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;

    if config.site.paradigm_path.is_some() != config.output.paradigm_dir.is_some() {
        return Err(ConfigError::Validation(
            "paradigm-path and paradigm-dir must be set together".to_string(),
        ));
    }

    Ok(())
}

/// Validates the remote site layout
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url must use HTTP or HTTPS, got '{}'",
            config.base_url
        )));
    }

    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' cannot be used as a base",
            config.base_url
        )));
    }

    require_non_empty("listing-path", &config.listing_path)?;
    require_non_empty("page-param", &config.page_param)?;
    require_non_empty("item-marker", &config.item_marker)?;

    if config.pages.is_empty() {
        return Err(ConfigError::Validation(
            "pages must list at least one listing page".to_string(),
        ));
    }

    if config.pages.iter().any(|p| p.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "pages cannot contain empty selectors".to_string(),
        ));
    }

    if let Some(subset) = &config.subset {
        require_non_empty("subset", subset)?;
        require_non_empty("subset-param", &config.subset_param)?;
    }

    if let Some(path) = &config.paradigm_path {
        require_non_empty("paradigm-path", path)?;
        require_non_empty("paradigm-param", &config.paradigm_param)?;
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.workers < 1 || config.workers > 256 {
        return Err(ConfigError::Validation(format!(
            "workers must be between 1 and 256, got {}",
            config.workers
        )));
    }

    if config.max_attempts < 1 || config.max_attempts > 100 {
        return Err(ConfigError::Validation(format!(
            "max-attempts must be between 1 and 100, got {}",
            config.max_attempts
        )));
    }

    if config.progress_interval < 1 {
        return Err(ConfigError::Validation(
            "progress-interval must be >= 1".to_string(),
        ));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "request-timeout-secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    require_non_empty("dictionary-dir", &config.dictionary_dir)?;
    require_non_empty("index-path", &config.index_path)?;

    if let Some(dir) = &config.paradigm_dir {
        require_non_empty("paradigm-dir", dir)?;
        if dir == &config.dictionary_dir {
            return Err(ConfigError::Validation(
                "paradigm-dir must differ from dictionary-dir".to_string(),
            ));
        }
    }

    if let Some(path) = &config.link_cache_path {
        require_non_empty("link-cache-path", path)?;
    }

    Ok(())
}

fn require_non_empty(name: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
    }
    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    let local = parts[0];
    let domain = parts[1];

    if local.is_empty() || domain.is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
