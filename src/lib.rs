//! RedGIFs Crawler - lists every media item published by a RedGIFs account.
//!
//! This library pages through an account's items on the RedGIFs API and
//! hands one record per item to a sink.
//!
//! # Features
//!
//! - Temporary bearer token acquisition with expiry tracking
//! - Page-by-page crawl with a single refresh-and-retry on 401/403
//! - Classified transport failures (DNS, timeout, HTTP status, unknown)
//! - Best-quality URL selection per item
//! - JSON-lines output
//!
//! # Example
//!
//! ```no_run
//! use redgifs_crawler::{ApiSettings, CrawlLoop, CrawlOptions, RedgifsApi, TokenStore};
//! use redgifs_crawler::media::Item;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let api = RedgifsApi::new(&ApiSettings::default())?;
//!     let tokens = TokenStore::new(api.clone());
//!     let mut crawl = CrawlLoop::new("some_user", tokens, api, CrawlOptions::default());
//!
//!     let mut items: Vec<Item> = Vec::new();
//!     let summary = crawl.run(&mut items).await;
//!     println!("{} items, stopped: {}", items.len(), summary.reason);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod crawl;
pub mod error;
pub mod media;
pub mod output;

// Re-exports for convenience
pub use api::{ApiSettings, RedgifsApi, TokenStore};
pub use config::{Config, OutputFields};
pub use crawl::{CrawlLoop, CrawlOptions, CrawlSummary, TerminationReason};
pub use error::{Error, Result};
pub use media::Item;
pub use output::{ItemSink, JsonLinesSink};
