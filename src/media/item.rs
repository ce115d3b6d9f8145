//! Emitted item record.

use serde::Serialize;
use serde_json::Value;

/// Fallback author name when the API omits one.
pub const UNKNOWN_USERNAME: &str = "Unknown";

/// One media entry as handed to the sink.
///
/// `url` is always serialized (as `null` when no variant exists); the
/// traceability fields are omitted when not selected.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Item {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    pub id: String,

    pub url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_date_raw: Option<Value>,

    /// Bearer token in effect when the page was fetched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl Item {
    /// Create an item carrying only id and url.
    pub fn new(id: impl Into<String>, url: Option<String>) -> Self {
        Self {
            username: None,
            id: id.into(),
            url,
            create_date_raw: None,
            token: None,
        }
    }

    /// Serialize to a single JSON line (no trailing newline).
    pub fn to_json_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
