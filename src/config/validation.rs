use crate::config::types::{CategoryConfig, Config, CrawlerConfig, OutputConfig, UserAgentConfig};
use crate::output::literal::is_identifier;
use crate::ConfigError;
use std::collections::HashSet;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    validate_categories(&config.categories)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_attempts < 1 || config.max_attempts > 10 {
        return Err(ConfigError::Validation(format!(
            "max_attempts must be between 1 and 10, got {}",
            config.max_attempts
        )));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.checkpoint_interval < 1 {
        return Err(ConfigError::Validation(format!(
            "checkpoint_interval must be >= 1, got {}",
            config.checkpoint_interval
        )));
    }

    if config.runaway_page_limit < 1 {
        return Err(ConfigError::Validation(format!(
            "runaway_page_limit must be >= 1, got {}",
            config.runaway_page_limit
        )));
    }

    Ok(())
}

/// Validates request header configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    for (name, value) in [
        ("user_agent", &config.user_agent),
        ("accept", &config.accept),
        ("accept_language", &config.accept_language),
    ] {
        if value.trim().is_empty() {
            return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
        }
        if value.chars().any(|c| c.is_control()) {
            return Err(ConfigError::Validation(format!(
                "{} contains control characters",
                name
            )));
        }
    }
    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validates the category registry
fn validate_categories(categories: &[CategoryConfig]) -> Result<(), ConfigError> {
    if categories.is_empty() {
        return Err(ConfigError::Validation(
            "at least one category must be configured".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for category in categories {
        if !seen.insert(category.key.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate category key '{}'",
                category.key
            )));
        }

        let url = Url::parse(&category.url).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid listing URL '{}': {}", category.url, e))
        })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::InvalidUrl(format!(
                "Listing URL '{}' must use HTTP or HTTPS",
                category.url
            )));
        }

        if category.id_prefix.is_empty() || category.body_part.is_empty() {
            return Err(ConfigError::Validation(format!(
                "category '{}' needs a non-empty id-prefix and body-part",
                category.key
            )));
        }

        if !category.output_path.ends_with(".ts") {
            return Err(ConfigError::Validation(format!(
                "output-path '{}' must end in .ts",
                category.output_path
            )));
        }

        validate_identifier(&category.variable_name)?;
    }

    Ok(())
}

/// Checks that an exported name is a plain TypeScript identifier
fn validate_identifier(name: &str) -> Result<(), ConfigError> {
    if is_identifier(name) {
        Ok(())
    } else {
        Err(ConfigError::Validation(format!(
            "variable-name '{}' is not a valid identifier",
            name
        )))
    }
}
