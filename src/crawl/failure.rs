//! Transport failure taxonomy and classification.
//!
//! Only 401/403 is recoverable (via a token refresh, handled by the crawl
//! loop). Every failure classified here ends the crawl.

use std::fmt;

use crate::api::types::ApiErrorBody;

/// Maximum number of body characters carried into logs.
pub const BODY_EXCERPT_LEN: usize = 500;

/// Kind of failure below or beside the application protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Dns,
    Timeout,
    HttpError(u16),
    Unknown,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Dns => write!(f, "dns"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::HttpError(status) => write!(f, "httpError({})", status),
            FailureKind::Unknown => write!(f, "unknown"),
        }
    }
}

/// A failed list request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportFailure {
    pub kind: FailureKind,
    /// Request URL or transport error text.
    pub detail: String,
    /// Response body, for HTTP errors.
    pub body: Option<String>,
}

impl TransportFailure {
    pub fn new(kind: FailureKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
            body: None,
        }
    }

    pub fn http(status: u16, url: impl Into<String>, body: String) -> Self {
        Self {
            kind: FailureKind::HttpError(status),
            detail: url.into(),
            body: Some(body),
        }
    }
}

/// Loggable classification of a [`TransportFailure`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureReport {
    pub kind: FailureKind,
    /// One-line human description.
    pub summary: String,
    /// `error.message` from the API body, if present.
    pub api_message: Option<String>,
    /// Truncated body when no API message could be extracted.
    pub body_excerpt: Option<String>,
}

impl FailureReport {
    /// Emit the report through `tracing`.
    pub fn log(&self) {
        tracing::error!(kind = %self.kind, "{}", self.summary);
        if let Some(message) = &self.api_message {
            tracing::error!("API error message: {}", message);
        } else if let Some(excerpt) = &self.body_excerpt {
            tracing::error!("Response body: {}", excerpt);
        }
    }
}

/// Classify a failure into a report.
pub fn classify(failure: &TransportFailure) -> FailureReport {
    let summary = match failure.kind {
        FailureKind::HttpError(status) => format!("HTTP error {} - {}", status, failure.detail),
        FailureKind::Dns => format!("DNS resolution failed: {}", failure.detail),
        FailureKind::Timeout => format!("Request timed out: {}", failure.detail),
        FailureKind::Unknown => format!("Unknown error: {}", failure.detail),
    };

    let (api_message, body_excerpt) = match (&failure.kind, &failure.body) {
        (FailureKind::HttpError(_), Some(body)) => match extract_error_message(body) {
            Some(message) => (Some(message), None),
            None if body.is_empty() => (None, None),
            None => (None, Some(truncate(body, BODY_EXCERPT_LEN))),
        },
        _ => (None, None),
    };

    FailureReport {
        kind: failure.kind,
        summary,
        api_message,
        body_excerpt,
    }
}

/// Extract a non-empty `error.message` from a JSON body.
pub fn extract_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ApiErrorBody>(body)
        .ok()?
        .error
        .message
        .filter(|m| !m.is_empty())
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
