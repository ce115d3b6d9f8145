//! Page cursor and the single-page fetch contract.

use async_trait::async_trait;

use crate::api::types::RawGif;
use crate::crawl::failure::TransportFailure;

/// Items requested per page unless configured otherwise.
pub const DEFAULT_PAGE_SIZE: u32 = 40;

/// Current pagination position. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    pub number: u32,
    pub size: u32,
}

impl PageCursor {
    /// Cursor positioned on the first page.
    pub fn first(size: u32) -> Self {
        Self { number: 1, size }
    }

    /// Move to the next page.
    pub fn advance(&mut self) {
        self.number += 1;
    }
}

/// Outcome of one list request.
#[derive(Debug)]
pub enum PageResult {
    /// 2xx response. An empty list means there is nothing more to fetch.
    Success { items: Vec<RawGif> },
    /// 401 or 403; the token is likely stale.
    AuthExpired { status: u16 },
    /// Anything else that went wrong.
    TransportFailure(TransportFailure),
}

/// Issues list requests for one account.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch `cursor`'s page of `user`'s items, attaching `token` when present.
    async fn fetch_page(&self, user: &str, cursor: PageCursor, token: Option<&str>) -> PageResult;
}
