//! The crawl loop: pages through one account until the API runs dry.
//!
//! The loop is an explicit state machine (see [`CrawlState`]). Pages are
//! fetched strictly one after another; a 401/403 triggers one forced token
//! refresh and a single retry of the same page.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rand::Rng;
use tokio::time::sleep;

use crate::api::types::RawGif;
use crate::api::token::{TokenProvider, TokenStore};
use crate::config::OutputFields;
use crate::crawl::failure::{classify, FailureReport};
use crate::crawl::page::{PageCursor, PageFetcher, PageResult, DEFAULT_PAGE_SIZE};
use crate::crawl::state::{CrawlState, CrawlSummary, TerminationReason};
use crate::media::parse_gif;
use crate::output::sink::ItemSink;

/// Random pause between two page requests, in milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageDelay {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl PageDelay {
    fn sample(&self) -> Option<Duration> {
        if self.max_ms == 0 {
            return None;
        }
        let ms = if self.min_ms >= self.max_ms {
            self.min_ms
        } else {
            rand::thread_rng().gen_range(self.min_ms..=self.max_ms)
        };
        Some(Duration::from_millis(ms))
    }
}

/// Tunables for a single crawl.
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    pub page_size: u32,
    pub fields: OutputFields,
    /// Stop after this many pages were emitted.
    pub max_pages: Option<u32>,
    pub page_delay: PageDelay,
    /// Stop instead of fetching unauthenticated when no token is available.
    pub strict_auth: bool,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            fields: OutputFields::default(),
            max_pages: None,
            page_delay: PageDelay::default(),
            strict_auth: false,
        }
    }
}

/// Drives one crawl of one account.
///
/// Owns its token store; never share one between accounts.
pub struct CrawlLoop<P, F> {
    user: String,
    tokens: TokenStore<P>,
    fetcher: F,
    options: CrawlOptions,
    cancel: Arc<AtomicBool>,
    pages_fetched: u64,
    items_emitted: u64,
    items_skipped: u64,
    failure: Option<FailureReport>,
}

impl<P: TokenProvider, F: PageFetcher> CrawlLoop<P, F> {
    pub fn new(
        user: impl Into<String>,
        tokens: TokenStore<P>,
        fetcher: F,
        options: CrawlOptions,
    ) -> Self {
        Self {
            user: user.into(),
            tokens,
            fetcher,
            options,
            cancel: Arc::new(AtomicBool::new(false)),
            pages_fetched: 0,
            items_emitted: 0,
            items_skipped: 0,
            failure: None,
        }
    }

    /// Use an externally owned cancellation flag.
    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = cancel;
        self
    }

    /// Flag that stops the crawl before its next request once set.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        self.cancel.clone()
    }

    /// Run the crawl to completion, handing every item to `sink`.
    pub async fn run<S: ItemSink>(&mut self, sink: &mut S) -> CrawlSummary {
        let started_at = Utc::now();
        tracing::info!("Crawling items of {}...", self.user);

        let mut state = CrawlState::start(self.options.page_size);
        let reason = loop {
            state = match state {
                CrawlState::Terminated(reason) => break reason,
                other => self.step(other, sink).await,
            };
        };

        if reason.is_success() {
            tracing::info!(
                "Crawl of {} finished ({}): {} items from {} pages",
                self.user,
                reason,
                self.items_emitted,
                self.pages_fetched
            );
        } else {
            tracing::warn!(
                "Crawl of {} stopped ({}) after {} items from {} pages",
                self.user,
                reason,
                self.items_emitted,
                self.pages_fetched
            );
        }

        CrawlSummary {
            user: self.user.clone(),
            pages_fetched: self.pages_fetched,
            items_emitted: self.items_emitted,
            items_skipped: self.items_skipped,
            token_refreshes: self.tokens.refresh_count(),
            reason,
            failure: self.failure.clone(),
            started_at,
            finished_at: Utc::now(),
        }
    }

    /// Advance the state machine by one transition.
    pub async fn step<S: ItemSink>(&mut self, state: CrawlState, sink: &mut S) -> CrawlState {
        match state {
            CrawlState::AwaitToken { cursor } => self.await_token(cursor).await,
            CrawlState::Fetching {
                cursor,
                token,
                retried,
            } => self.fetch(cursor, token, retried).await,
            CrawlState::Refreshing { cursor } => self.refresh(cursor).await,
            CrawlState::Emitting {
                cursor,
                items,
                token,
            } => self.emit(cursor, items, token, sink),
            terminated @ CrawlState::Terminated(_) => terminated,
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    async fn await_token(&mut self, cursor: PageCursor) -> CrawlState {
        if let Some(max_pages) = self.options.max_pages {
            if cursor.number > max_pages {
                tracing::info!("Page limit of {} reached", max_pages);
                return CrawlState::Terminated(TerminationReason::PageLimit);
            }
        }

        if cursor.number > 1 {
            if let Some(delay) = self.options.page_delay.sample() {
                tracing::debug!("Waiting {:?} before page {}", delay, cursor.number);
                sleep(delay).await;
            }
        }

        if self.is_cancelled() {
            return CrawlState::Terminated(TerminationReason::Cancelled);
        }

        match self.tokens.get_valid_token().await.map(|t| t.value.clone()) {
            Ok(token) => CrawlState::Fetching {
                cursor,
                token: Some(token),
                retried: false,
            },
            Err(e) if self.options.strict_auth => {
                tracing::error!("Cannot fetch page {} without a token: {}", cursor.number, e);
                CrawlState::Terminated(TerminationReason::NoToken)
            }
            Err(e) => {
                tracing::warn!(
                    "No token available ({}); requesting page {} unauthenticated",
                    e,
                    cursor.number
                );
                CrawlState::Fetching {
                    cursor,
                    token: None,
                    retried: false,
                }
            }
        }
    }

    async fn fetch(&mut self, cursor: PageCursor, token: Option<String>, retried: bool) -> CrawlState {
        if self.is_cancelled() {
            return CrawlState::Terminated(TerminationReason::Cancelled);
        }

        tracing::debug!("Fetching page {} of {}", cursor.number, self.user);
        let result = self
            .fetcher
            .fetch_page(&self.user, cursor, token.as_deref())
            .await;

        match result {
            PageResult::Success { items } if items.is_empty() => {
                tracing::info!("Page {} is empty, no more items", cursor.number);
                CrawlState::Terminated(TerminationReason::Exhausted)
            }
            PageResult::Success { items } => {
                tracing::debug!("Got {} items on page {}", items.len(), cursor.number);
                CrawlState::Emitting {
                    cursor,
                    items,
                    token,
                }
            }
            PageResult::AuthExpired { status } if !retried => {
                if token.is_some() && self.tokens.has_valid_token() {
                    tracing::warn!(
                        "HTTP {} on page {} although the token was believed valid; \
                         the assumed token lifetime may be too long",
                        status,
                        cursor.number
                    );
                } else {
                    tracing::info!(
                        "HTTP {} on page {}, token probably expired; refreshing",
                        status,
                        cursor.number
                    );
                }
                CrawlState::Refreshing { cursor }
            }
            PageResult::AuthExpired { status } => {
                tracing::error!(
                    "HTTP {} on page {} again after refreshing the token; giving up",
                    status,
                    cursor.number
                );
                CrawlState::Terminated(TerminationReason::AuthExpiredAfterRetry)
            }
            PageResult::TransportFailure(failure) => {
                let report = classify(&failure);
                report.log();
                self.failure = Some(report);
                CrawlState::Terminated(TerminationReason::Transport(failure.kind))
            }
        }
    }

    async fn refresh(&mut self, cursor: PageCursor) -> CrawlState {
        if self.is_cancelled() {
            return CrawlState::Terminated(TerminationReason::Cancelled);
        }

        match self.tokens.force_refresh().await.map(|t| t.value.clone()) {
            Ok(token) => CrawlState::Fetching {
                cursor,
                token: Some(token),
                retried: true,
            },
            Err(e) => {
                tracing::error!("Token refresh for page {} failed: {}", cursor.number, e);
                CrawlState::Terminated(TerminationReason::NoToken)
            }
        }
    }

    fn emit<S: ItemSink>(
        &mut self,
        mut cursor: PageCursor,
        items: Vec<RawGif>,
        token: Option<String>,
        sink: &mut S,
    ) -> CrawlState {
        for raw in items {
            let Some(item) = parse_gif(raw, token.as_deref(), self.options.fields) else {
                tracing::warn!("Skipping item without id on page {}", cursor.number);
                self.items_skipped += 1;
                continue;
            };

            if let Err(e) = sink.emit(&item) {
                tracing::error!("{}", e);
                return CrawlState::Terminated(TerminationReason::SinkFailed(e.to_string()));
            }
            self.items_emitted += 1;
        }

        self.pages_fetched += 1;
        cursor.advance();
        CrawlState::AwaitToken { cursor }
    }
}
