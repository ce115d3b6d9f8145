//! Crawl state machine states and the end-of-crawl summary.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::api::types::RawGif;
use crate::crawl::failure::{FailureKind, FailureReport};
use crate::crawl::page::PageCursor;
use crate::error::exit_codes;

/// Why a crawl stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminationReason {
    /// The API returned an empty page.
    Exhausted,
    /// 401/403 again after a forced refresh on the same page.
    AuthExpiredAfterRetry,
    /// A non-recoverable transport or HTTP failure.
    Transport(FailureKind),
    /// No token could be obtained where one was required.
    NoToken,
    /// The configured page limit was reached.
    PageLimit,
    /// The host asked the crawl to stop.
    Cancelled,
    /// The sink refused a record.
    SinkFailed(String),
}

impl TerminationReason {
    /// Whether this is a normal end of the crawl.
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            TerminationReason::Exhausted | TerminationReason::PageLimit
        )
    }

    /// Process exit code for a crawl that ended this way.
    pub fn exit_code(&self) -> i32 {
        match self {
            TerminationReason::Exhausted | TerminationReason::PageLimit => exit_codes::SUCCESS,
            TerminationReason::Cancelled => exit_codes::ABORT,
            TerminationReason::SinkFailed(_) => exit_codes::OUTPUT_ERROR,
            TerminationReason::AuthExpiredAfterRetry
            | TerminationReason::Transport(_)
            | TerminationReason::NoToken => exit_codes::API_ERROR,
        }
    }
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminationReason::Exhausted => write!(f, "exhausted"),
            TerminationReason::AuthExpiredAfterRetry => write!(f, "authExpiredAfterRetry"),
            TerminationReason::Transport(kind) => write!(f, "transport({})", kind),
            TerminationReason::NoToken => write!(f, "noToken"),
            TerminationReason::PageLimit => write!(f, "pageLimit"),
            TerminationReason::Cancelled => write!(f, "cancelled"),
            TerminationReason::SinkFailed(detail) => write!(f, "sinkFailed({})", detail),
        }
    }
}

/// States of the crawl loop.
#[derive(Debug)]
pub enum CrawlState {
    /// Obtain a token for the next request.
    AwaitToken { cursor: PageCursor },
    /// Request the page; `retried` is set after a forced refresh.
    Fetching {
        cursor: PageCursor,
        token: Option<String>,
        retried: bool,
    },
    /// Replace the token and retry the same page once.
    Refreshing { cursor: PageCursor },
    /// Hand a page's items to the sink.
    Emitting {
        cursor: PageCursor,
        items: Vec<RawGif>,
        token: Option<String>,
    },
    Terminated(TerminationReason),
}

impl CrawlState {
    /// Initial state for a crawl with the given page size.
    pub fn start(page_size: u32) -> Self {
        CrawlState::AwaitToken {
            cursor: PageCursor::first(page_size),
        }
    }
}

/// Outcome of a finished crawl.
#[derive(Debug, Clone)]
pub struct CrawlSummary {
    pub user: String,
    pub pages_fetched: u64,
    pub items_emitted: u64,
    pub items_skipped: u64,
    pub token_refreshes: u64,
    pub reason: TerminationReason,
    /// Classification of the failure that ended the crawl, if any.
    pub failure: Option<FailureReport>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl CrawlSummary {
    /// Wall-clock duration of the crawl.
    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_labels() {
        assert_eq!(TerminationReason::Exhausted.to_string(), "exhausted");
        assert_eq!(
            TerminationReason::AuthExpiredAfterRetry.to_string(),
            "authExpiredAfterRetry"
        );
        assert_eq!(
            TerminationReason::Transport(FailureKind::HttpError(500)).to_string(),
            "transport(httpError(500))"
        );
        assert_eq!(TerminationReason::NoToken.to_string(), "noToken");
    }

    #[test]
    fn test_only_normal_endings_are_success() {
        assert!(TerminationReason::Exhausted.is_success());
        assert!(TerminationReason::PageLimit.is_success());
        assert!(!TerminationReason::Cancelled.is_success());
        assert!(!TerminationReason::Transport(FailureKind::Dns).is_success());
        assert!(!TerminationReason::AuthExpiredAfterRetry.is_success());
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(TerminationReason::Exhausted.exit_code(), exit_codes::SUCCESS);
        assert_eq!(TerminationReason::Cancelled.exit_code(), exit_codes::ABORT);
        assert_eq!(
            TerminationReason::SinkFailed("closed".into()).exit_code(),
            exit_codes::OUTPUT_ERROR
        );
        assert_eq!(
            TerminationReason::Transport(FailureKind::Timeout).exit_code(),
            exit_codes::API_ERROR
        );
    }

    #[test]
    fn test_start_state() {
        match CrawlState::start(40) {
            CrawlState::AwaitToken { cursor } => assert_eq!(cursor, PageCursor::first(40)),
            other => panic!("unexpected start state: {:?}", other),
        }
    }
}
