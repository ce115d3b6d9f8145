//! Crawl module: the page-by-page fetch loop.
//!
//! This module provides:
//! - The page cursor and the page fetch contract
//! - Transport failure classification
//! - The crawl state machine and its summary

pub mod failure;
pub mod page;
pub mod runner;
pub mod state;

pub use failure::{classify, FailureKind, FailureReport, TransportFailure};
pub use page::{PageCursor, PageFetcher, PageResult, DEFAULT_PAGE_SIZE};
pub use runner::{CrawlLoop, CrawlOptions, PageDelay};
pub use state::{CrawlState, CrawlSummary, TerminationReason};
