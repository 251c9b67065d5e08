use crate::config::types::{Config, CrawlerConfig, OutputConfig};
use crate::url::{normalize_root, NormalizePolicy};
use crate::ConfigError;

/// Upper bound for the worker pool size
const MAX_CONCURRENCY: usize = 64;

/// Upper bound for per-page retry attempts
const MAX_RETRIES: u32 = 5;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_output_config(&config.output)?;
    validate_exclusions(&config.exclude)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.root_url.trim().is_empty() {
        return Err(ConfigError::InvalidUrl(
            "a root URL is required".to_string(),
        ));
    }

    normalize_root(&config.root_url, &NormalizePolicy::default())?;

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.concurrency < 1 || config.concurrency > MAX_CONCURRENCY {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and {}, got {}",
            MAX_CONCURRENCY, config.concurrency
        )));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.run_timeout_secs == Some(0) {
        return Err(ConfigError::Validation(
            "run_timeout_secs must be >= 1 when set".to_string(),
        ));
    }

    if config.retries > MAX_RETRIES {
        return Err(ConfigError::Validation(format!(
            "retries must be at most {}, got {}",
            MAX_RETRIES, config.retries
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if let Some(dir) = &config.directory {
        if dir.trim().is_empty() {
            return Err(ConfigError::Validation(
                "output directory cannot be empty".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates exclusion rules
fn validate_exclusions(rules: &[String]) -> Result<(), ConfigError> {
    // An empty rule would match every path
    if rules.iter().any(|rule| rule.is_empty()) {
        return Err(ConfigError::Validation(
            "exclusion rules cannot be empty".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        Config::for_root("https://example.com")
    }

    #[test]
    fn test_valid_config() {
        assert!(validate(&valid_config()).is_ok());
    }

    #[test]
    fn test_missing_root() {
        let config = Config::default();
        assert!(matches!(validate(&config), Err(ConfigError::InvalidUrl(_))));
    }

    #[test]
    fn test_invalid_root() {
        for root in ["not a url", "ftp://example.com", "mailto:me@example.com"] {
            let config = Config::for_root(root);
            assert!(
                matches!(validate(&config), Err(ConfigError::InvalidUrl(_))),
                "{} should be rejected",
                root
            );
        }
    }

    #[test]
    fn test_limits() {
        let mut config = valid_config();
        config.crawler.max_pages = 0;
        assert!(validate(&config).is_err());

        let mut config = valid_config();
        config.crawler.concurrency = 0;
        assert!(validate(&config).is_err());

        let mut config = valid_config();
        config.crawler.concurrency = 65;
        assert!(validate(&config).is_err());

        let mut config = valid_config();
        config.crawler.request_timeout_secs = 0;
        assert!(validate(&config).is_err());

        let mut config = valid_config();
        config.crawler.run_timeout_secs = Some(0);
        assert!(validate(&config).is_err());

        let mut config = valid_config();
        config.crawler.retries = 6;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_empty_exclusion_rule() {
        let mut config = valid_config();
        config.exclude = vec!["blog".to_string(), String::new()];
        assert!(matches!(validate(&config), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_empty_output_directory() {
        let mut config = valid_config();
        config.output.directory = Some("  ".to_string());
        assert!(validate(&config).is_err());
    }
}
