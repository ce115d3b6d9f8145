//! Configuration validation logic.

use regex::Regex;
use url::Url;

use crate::config::loader::Config;
use crate::error::{Error, Result};

/// Largest page size the list endpoint accepts.
const MAX_PAGE_SIZE: u32 = 100;

/// Upper bound for the assumed token lifetime (24 hours).
const MAX_TOKEN_LIFETIME_MINUTES: u64 = 24 * 60;

/// Validate the entire configuration.
pub fn validate_config(config: &Config) -> Result<()> {
    validate_user(config.user())?;
    validate_http_url("base_url", &config.api.base_url)?;
    validate_http_url("site_url", &config.api.site_url)?;
    validate_page_size(config.api.page_size)?;
    validate_timeout(config.api.timeout_seconds)?;
    validate_token_timing(config)?;
    validate_page_delay(config)?;

    Ok(())
}

/// Validate the crawl target.
pub fn validate_user(user: Option<&str>) -> Result<()> {
    let Some(user) = user else {
        return Err(Error::MissingConfig(
            "user (the account to crawl)".to_string(),
        ));
    };

    // Usernames: letters, digits, underscores, hyphens and dots.
    let pattern = Regex::new(r"^[A-Za-z0-9_.-]{1,64}$")
        .map_err(|e| Error::Config(format!("Invalid username pattern: {}", e)))?;

    if !pattern.is_match(user) {
        return Err(Error::ConfigValidation {
            field: "user".to_string(),
            message: format!(
                "Username '{}' is invalid. Use 1-64 letters, digits, '_', '-' or '.'.",
                user
            ),
        });
    }

    Ok(())
}

fn validate_http_url(field: &str, raw: &str) -> Result<()> {
    let url = Url::parse(raw).map_err(|e| Error::ConfigValidation {
        field: field.to_string(),
        message: format!("'{}' is not a valid URL: {}", raw, e),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::ConfigValidation {
            field: field.to_string(),
            message: format!("'{}' must use http or https", raw),
        });
    }

    Ok(())
}

/// Validate the page size.
pub fn validate_page_size(page_size: u32) -> Result<()> {
    if page_size == 0 || page_size > MAX_PAGE_SIZE {
        return Err(Error::ConfigValidation {
            field: "page_size".to_string(),
            message: format!(
                "Page size must be between 1 and {} (got {})",
                MAX_PAGE_SIZE, page_size
            ),
        });
    }

    Ok(())
}

/// Validate the request timeout.
pub fn validate_timeout(timeout_seconds: u64) -> Result<()> {
    if timeout_seconds == 0 {
        return Err(Error::ConfigValidation {
            field: "timeout_seconds".to_string(),
            message: "Request timeout must be at least 1 second".to_string(),
        });
    }

    Ok(())
}

fn validate_token_timing(config: &Config) -> Result<()> {
    if config.token.lifetime_minutes > MAX_TOKEN_LIFETIME_MINUTES {
        return Err(Error::ConfigValidation {
            field: "lifetime_minutes".to_string(),
            message: format!(
                "Token lifetime ({} min) must not exceed {} min",
                config.token.lifetime_minutes, MAX_TOKEN_LIFETIME_MINUTES
            ),
        });
    }

    if config.token_lifetime() <= config.token_skew() {
        return Err(Error::ConfigValidation {
            field: "lifetime_minutes".to_string(),
            message: format!(
                "Token lifetime ({} min) must exceed the expiry skew ({} s)",
                config.token.lifetime_minutes, config.token.expiry_skew_seconds
            ),
        });
    }

    Ok(())
}

fn validate_page_delay(config: &Config) -> Result<()> {
    if config.crawl.page_delay_min_ms > config.crawl.page_delay_max_ms {
        return Err(Error::ConfigValidation {
            field: "page_delay_min_ms".to_string(),
            message: format!(
                "Minimum page delay ({} ms) exceeds the maximum ({} ms)",
                config.crawl.page_delay_min_ms, config.crawl.page_delay_max_ms
            ),
        });
    }

    Ok(())
}
