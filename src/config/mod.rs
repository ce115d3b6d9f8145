//! Configuration module for the redgifs-crawler.
//!
//! This module handles:
//! - Loading configuration from TOML files
//! - Output field selection
//! - Configuration validation

pub mod fields;
pub mod loader;
pub mod validation;

pub use fields::OutputFields;
pub use loader::{ApiConfig, Config, CrawlConfig, OutputConfig, TargetConfig, TokenConfig};
pub use validation::{validate_config, validate_page_size, validate_timeout, validate_user};
