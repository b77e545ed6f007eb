use crate::config::types::{Config, CrawlConfig, OutputConfig, SelectorConfig, TargetConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawl_config(&config.crawl)?;
    validate_target_config(&config.target)?;
    validate_selector_config(&config.selectors)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawl configuration
fn validate_crawl_config(config: &CrawlConfig) -> Result<(), ConfigError> {
    if config.page_count < 1 {
        return Err(ConfigError::Validation(format!(
            "page_count must be >= 1, got {}",
            config.page_count
        )));
    }

    if config.worker_count < 1 || config.worker_count > 100 {
        return Err(ConfigError::Validation(format!(
            "worker_count must be between 1 and 100, got {}",
            config.worker_count
        )));
    }

    if config.per_request_timeout_ms < 1000 {
        return Err(ConfigError::Validation(format!(
            "per_request_timeout_ms must be >= 1000ms, got {}ms",
            config.per_request_timeout_ms
        )));
    }

    if config.backoff_base_ms < 1 {
        return Err(ConfigError::Validation(
            "backoff_base_ms must be >= 1ms".to_string(),
        ));
    }

    if config.backoff_base_ms > config.backoff_max_ms {
        return Err(ConfigError::Validation(format!(
            "backoff_base_ms ({}ms) must not exceed backoff_max_ms ({}ms)",
            config.backoff_base_ms, config.backoff_max_ms
        )));
    }

    if config.rate_limit_min_ms > config.rate_limit_max_ms {
        return Err(ConfigError::Validation(format!(
            "rate_limit_min_ms ({}ms) must not exceed rate_limit_max_ms ({}ms)",
            config.rate_limit_min_ms, config.rate_limit_max_ms
        )));
    }

    Ok(())
}

/// Validates target configuration
fn validate_target_config(config: &TargetConfig) -> Result<(), ConfigError> {
    if config.listing_url.is_empty() {
        return Err(ConfigError::Validation(
            "listing_url cannot be empty".to_string(),
        ));
    }

    // The page number is appended later; the prefix alone must already parse
    Url::parse(&config.listing_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid listing_url: {}", e)))?;

    if let Some(agent) = &config.user_agent {
        if agent.is_empty() {
            return Err(ConfigError::Validation(
                "user_agent, when set, cannot be empty".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates selector configuration
fn validate_selector_config(config: &SelectorConfig) -> Result<(), ConfigError> {
    let required = [
        ("card-container", &config.card_container),
        ("card-id-prefix", &config.card_id_prefix),
        ("detail-title", &config.detail_title),
        ("detail-description", &config.detail_description),
    ];

    for (name, value) in required {
        if value.is_empty() {
            return Err(ConfigError::Validation(format!(
                "selector '{}' cannot be empty",
                name
            )));
        }
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.csv_path.is_empty() {
        return Err(ConfigError::Validation(
            "csv_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}
