//! API response type definitions.

use serde::Deserialize;
use serde_json::Value;

/// Response of the temporary-token endpoint.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub token: Option<String>,
}

/// Response of the user search (list) endpoint.
///
/// Only `gifs` is read; paging metadata is ignored because an empty page is
/// the end-of-data signal.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub gifs: Vec<RawGif>,
}

/// One media entry as returned by the API.
///
/// Every field is optional so a single odd entry cannot make the whole page
/// unreadable.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawGif {
    #[serde(default)]
    pub id: Option<String>,

    /// Quality-keyed URL variants (`hd`, `sd`, `poster`, ...).
    #[serde(default)]
    pub urls: Option<Value>,

    #[serde(default)]
    pub user_name: Option<String>,

    /// Creation date, passed through untouched.
    #[serde(default)]
    pub create_date: Option<Value>,
}

/// Error body shape: `{"error": {"message": "..."}}`.
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub error: ApiErrorDetail,
}

/// Inner error object.
#[derive(Debug, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(default)]
    pub message: Option<String>,
}
