//! Configuration structures and loading logic.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::api::client::{ApiSettings, API_BASE, SITE_URL};
use crate::config::fields::OutputFields;
use crate::crawl::{CrawlOptions, PageDelay, DEFAULT_PAGE_SIZE};
use crate::error::{Error, Result};

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub target: TargetConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub token: TokenConfig,

    #[serde(default)]
    pub crawl: CrawlConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawl target.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Account whose items are listed.
    #[serde(default)]
    pub user: Option<String>,
}

/// API endpoint and request settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Sent as `Referer` (with a trailing slash) and `Origin`.
    #[serde(default = "default_site_url")]
    pub site_url: String,

    /// Browser user agent string.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_page_size")]
    pub page_size: u32,

    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            site_url: default_site_url(),
            user_agent: default_user_agent(),
            page_size: default_page_size(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

/// Token lifetime assumptions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Estimated lifetime; the API does not report one.
    #[serde(default = "default_lifetime_minutes")]
    pub lifetime_minutes: u64,

    #[serde(default = "default_expiry_skew_seconds")]
    pub expiry_skew_seconds: u64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            lifetime_minutes: default_lifetime_minutes(),
            expiry_skew_seconds: default_expiry_skew_seconds(),
        }
    }
}

/// Crawl loop options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// Stop after this many pages.
    #[serde(default)]
    pub max_pages: Option<u32>,

    #[serde(default)]
    pub page_delay_min_ms: u64,

    /// Zero disables the delay.
    #[serde(default)]
    pub page_delay_max_ms: u64,

    /// Refuse to fetch without a token.
    #[serde(default)]
    pub strict_auth: bool,
}

/// Output options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub fields: OutputFields,

    /// Write records here instead of stdout.
    #[serde(default)]
    pub file: Option<PathBuf>,
}

pub fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/141.0.0.0 Safari/537.36".to_string()
}

fn default_base_url() -> String {
    API_BASE.to_string()
}

fn default_site_url() -> String {
    SITE_URL.to_string()
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_lifetime_minutes() -> u64 {
    90
}

fn default_expiry_skew_seconds() -> u64 {
    30
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::Config(format!(
                    "Configuration file not found: {}. Create one from config.example.toml",
                    path.display()
                ))
            } else {
                Error::Io(e)
            }
        })?;

        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// The crawl target with any leading `@` removed.
    pub fn user(&self) -> Option<&str> {
        self.target
            .user
            .as_deref()
            .map(|u| u.trim().trim_start_matches('@'))
            .filter(|u| !u.is_empty())
    }

    /// Settings for the HTTP client.
    pub fn api_settings(&self) -> ApiSettings {
        ApiSettings {
            base_url: self.api.base_url.clone(),
            site_url: self.api.site_url.clone(),
            user_agent: self.api.user_agent.clone(),
            timeout: Duration::from_secs(self.api.timeout_seconds),
        }
    }

    /// Options for the crawl loop.
    pub fn crawl_options(&self) -> CrawlOptions {
        CrawlOptions {
            page_size: self.api.page_size,
            fields: self.output.fields,
            max_pages: self.crawl.max_pages,
            page_delay: PageDelay {
                min_ms: self.crawl.page_delay_min_ms,
                max_ms: self.crawl.page_delay_max_ms,
            },
            strict_auth: self.crawl.strict_auth,
        }
    }

    pub fn token_lifetime(&self) -> Duration {
        Duration::from_secs(self.token.lifetime_minutes.saturating_mul(60))
    }

    pub fn token_skew(&self) -> Duration {
        Duration::from_secs(self.token.expiry_skew_seconds)
    }
}
