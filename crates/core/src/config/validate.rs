use std::collections::HashSet;

use super::{
    types::{BrowserBackend, Config},
    ConfigError,
};

/// Validate configuration
/// Currently validates:
/// - Movie name and date are not blank; date has no '/' or whitespace
/// - At least one theatre, every field filled, no '/' in fields, codes unique
/// - Retry attempts and page timeout are at least 1
/// - The webdriver backend has a driver URL
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.movie_name.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "movie_name cannot be empty".to_string(),
        ));
    }

    let date = config.date.trim();
    if date.is_empty() {
        return Err(ConfigError::ValidationError(
            "date cannot be empty".to_string(),
        ));
    }
    if date.contains('/') || date.chars().any(char::is_whitespace) {
        return Err(ConfigError::ValidationError(format!(
            "date '{}' must not contain '/' or whitespace",
            config.date
        )));
    }

    if config.theatres.is_empty() {
        return Err(ConfigError::ValidationError(
            "at least one theatre must be configured".to_string(),
        ));
    }

    let mut codes = HashSet::new();
    for (idx, theatre) in config.theatres.iter().enumerate() {
        for (field, value) in [
            ("city", &theatre.city),
            ("slug", &theatre.slug),
            ("code", &theatre.code),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "theatres[{}].{} cannot be empty",
                    idx, field
                )));
            }
            if value.contains('/') {
                return Err(ConfigError::ValidationError(format!(
                    "theatres[{}].{} must not contain '/'",
                    idx, field
                )));
            }
        }
        if !codes.insert(theatre.code.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "duplicate theatre code '{}'",
                theatre.code
            )));
        }
    }

    if config.retry.max_attempts == 0 {
        return Err(ConfigError::ValidationError(
            "retry.max_attempts must be at least 1".to_string(),
        ));
    }

    if config.browser.page_timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "browser.page_timeout_secs must be at least 1".to_string(),
        ));
    }

    if config.browser.backend == BrowserBackend::Webdriver
        && config.browser.webdriver_url.trim().is_empty()
    {
        return Err(ConfigError::ValidationError(
            "browser.webdriver_url is required for the webdriver backend".to_string(),
        ));
    }

    Ok(())
}
