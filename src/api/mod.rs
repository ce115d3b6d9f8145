//! RedGIFs API module.
//!
//! This module provides:
//! - HTTP client for the RedGIFs REST API
//! - Bearer token caching and refresh
//! - API response types

pub mod client;
pub mod token;
pub mod types;

pub use client::{ApiSettings, RedgifsApi, API_BASE, SITE_URL};
pub use token::{Token, TokenProvider, TokenStore};
pub use types::*;
