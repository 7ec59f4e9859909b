use crate::config::types::{Config, CrawlerConfig, HttpConfig, OutputConfig, SiteConfig};
use crate::crawler::Selectors;
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_http_config(&config.http)?;
    validate_crawler_config(&config.crawler)?;
    validate_output_config(&config.output)?;
    Selectors::compile(&config.selectors)?;
    Ok(())
}

/// Validates the remote site layout
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let base = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if base.scheme() != "http" && base.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "base-url '{}' must use http or https",
            config.base_url
        )));
    }

    if !config.listing_path_template.contains("{page}") {
        return Err(ConfigError::Validation(format!(
            "listing-path-template must contain '{{page}}', got '{}'",
            config.listing_path_template
        )));
    }

    Url::parse(&config.placeholder_image_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid placeholder-image-url: {}", e)))?;

    Ok(())
}

/// Validates HTTP timeouts and retry bounds
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.request_timeout_ms < 1 {
        return Err(ConfigError::Validation(
            "request-timeout-ms must be >= 1".to_string(),
        ));
    }

    if config.max_retries > 20 {
        return Err(ConfigError::Validation(format!(
            "max-retries must be <= 20, got {}",
            config.max_retries
        )));
    }

    if config.backoff_max_ms < config.backoff_base_ms {
        return Err(ConfigError::Validation(format!(
            "backoff-max-ms ({}) must not be below backoff-base-ms ({})",
            config.backoff_max_ms, config.backoff_base_ms
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates quota and page ceilings
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_items < 1 {
        return Err(ConfigError::Validation(format!(
            "max-items must be >= 1, got {}",
            config.max_items
        )));
    }

    if config.max_pages == Some(0) {
        return Err(ConfigError::Validation(
            "max-pages must be >= 1 when set".to_string(),
        ));
    }

    if config.max_consecutive_empty_pages == Some(0) {
        return Err(ConfigError::Validation(
            "max-consecutive-empty-pages must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates output locations
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.images_dir.is_empty() {
        return Err(ConfigError::Validation(
            "images-dir cannot be empty".to_string(),
        ));
    }

    if config.metadata_path.is_empty() {
        return Err(ConfigError::Validation(
            "metadata-path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_site_config() {
        let mut site = SiteConfig::default();
        assert!(validate_site_config(&site).is_ok());

        site.base_url = "not a url".to_string();
        assert!(matches!(
            validate_site_config(&site),
            Err(ConfigError::InvalidUrl(_))
        ));

        site.base_url = "ftp://polkrf.ru".to_string();
        assert!(matches!(
            validate_site_config(&site),
            Err(ConfigError::Validation(_))
        ));

        let mut site = SiteConfig::default();
        site.listing_path_template = "/veterans".to_string();
        assert!(validate_site_config(&site).is_err());
    }

    #[test]
    fn test_validate_crawler_config() {
        let mut crawler = CrawlerConfig::default();
        assert!(validate_crawler_config(&crawler).is_ok());

        crawler.max_pages = Some(0);
        assert!(validate_crawler_config(&crawler).is_err());

        crawler.max_pages = Some(3);
        crawler.max_consecutive_empty_pages = Some(0);
        assert!(validate_crawler_config(&crawler).is_err());
    }

    #[test]
    fn test_validate_http_config() {
        let mut http = HttpConfig::default();
        http.request_timeout_ms = 0;
        assert!(validate_http_config(&http).is_err());

        let mut http = HttpConfig::default();
        http.backoff_max_ms = 10;
        assert!(validate_http_config(&http).is_err());
    }

    #[test]
    fn test_invalid_selector_rejected() {
        let mut config = Config::default();
        config.selectors.card = "a[[".to_string();
        assert!(matches!(
            validate(&config),
            Err(ConfigError::InvalidSelector(_))
        ));
    }
}
