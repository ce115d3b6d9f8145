//! Command-line argument definitions using clap.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::config::{Config, OutputFields};

/// RedGIFs account crawler CLI.
#[derive(Parser, Debug)]
#[command(
    name = "redgifs-crawler",
    version,
    about = "List every media item published by a RedGIFs account",
    long_about = "Pages through an account's items, newest first, and prints one JSON record per item.\n\n\
                  Records go to stdout (or --output); logs and status lines go to stderr."
)]
pub struct Args {
    /// Account to crawl.
    pub user: Option<String>,

    /// Path to configuration file.
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Write records to this file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Fields carried by each record.
    #[arg(long, value_enum)]
    pub fields: Option<FieldsArg>,

    /// API base URL.
    #[arg(long = "base-url", env = "REDGIFS_BASE_URL")]
    pub base_url: Option<String>,

    /// Browser user agent string.
    #[arg(short = 'a', long = "user-agent", env = "REDGIFS_USER_AGENT")]
    pub user_agent: Option<String>,

    /// Items requested per page.
    #[arg(long)]
    pub page_size: Option<u32>,

    /// Stop after this many pages.
    #[arg(long)]
    pub max_pages: Option<u32>,

    /// Assumed token lifetime in minutes.
    #[arg(long)]
    pub token_lifetime: Option<u64>,

    /// Request timeout in seconds.
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Stop instead of crawling unauthenticated when no token can be obtained.
    #[arg(long)]
    pub strict_auth: bool,

    /// Hide the progress spinner and summary.
    #[arg(long, short)]
    pub quiet: bool,

    /// Enable debug logging.
    #[arg(long)]
    pub debug: bool,
}

/// CLI output field set argument.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FieldsArg {
    /// Username, id, url, raw creation date and token.
    Full,
    /// Id and url only.
    Minimal,
}

impl From<FieldsArg> for OutputFields {
    fn from(arg: FieldsArg) -> Self {
        match arg {
            FieldsArg::Full => OutputFields::Full,
            FieldsArg::Minimal => OutputFields::Minimal,
        }
    }
}

impl Args {
    /// Merge CLI arguments into an existing config, overriding where specified.
    pub fn merge_into_config(&self, config: &mut Config) {
        if let Some(user) = &self.user {
            config.target.user = Some(user.clone());
        }

        if let Some(output) = &self.output {
            config.output.file = Some(output.clone());
        }

        if let Some(fields) = self.fields {
            config.output.fields = fields.into();
        }

        if let Some(base_url) = &self.base_url {
            config.api.base_url = base_url.clone();
        }

        if let Some(user_agent) = &self.user_agent {
            config.api.user_agent = user_agent.clone();
        }

        if let Some(page_size) = self.page_size {
            config.api.page_size = page_size;
        }

        if let Some(max_pages) = self.max_pages {
            config.crawl.max_pages = Some(max_pages);
        }

        if let Some(minutes) = self.token_lifetime {
            config.token.lifetime_minutes = minutes;
        }

        if let Some(timeout) = self.timeout {
            config.api.timeout_seconds = timeout;
        }

        // Boolean flags (only override if set to non-default)
        if self.strict_auth {
            config.crawl.strict_auth = true;
        }
    }
}
