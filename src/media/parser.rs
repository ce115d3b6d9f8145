//! Projection of raw API entries into emitted items.

use serde_json::Value;

use crate::api::types::RawGif;
use crate::config::OutputFields;
use crate::media::item::{Item, UNKNOWN_USERNAME};

/// URL variant keys, best first.
pub const QUALITY_PREFERENCE: &[&str] = &["hd", "sd"];

/// Project a raw entry into an [`Item`].
///
/// Returns `None` for entries without an identifier.
pub fn parse_gif(raw: RawGif, token: Option<&str>, fields: OutputFields) -> Option<Item> {
    let id = raw.id.filter(|id| !id.is_empty())?;
    let url = raw.urls.as_ref().and_then(select_url);

    if !fields.includes_metadata() {
        return Some(Item::new(id, url));
    }

    Some(Item {
        username: Some(
            raw.user_name
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| UNKNOWN_USERNAME.to_string()),
        ),
        id,
        url,
        create_date_raw: raw.create_date,
        token: token.map(str::to_string),
    })
}

/// Pick the best available URL from a quality-keyed map.
///
/// Empty strings and non-string values count as absent.
pub fn select_url(urls: &Value) -> Option<String> {
    let map = urls.as_object()?;

    QUALITY_PREFERENCE
        .iter()
        .filter_map(|quality| map.get(*quality).and_then(Value::as_str))
        .find(|url| !url.is_empty())
        .map(str::to_string)
}
