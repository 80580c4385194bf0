use chrono::{Local, NaiveDate};
use percent_encoding::percent_decode_str;
use url::Url;

/// Formats a calendar date as the conversation key. The key is also the
/// document id of a day's conversation, so the format must stay stable.
pub fn format_date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Conversation key for the current local date.
pub fn today_key() -> String {
    format_date_key(Local::now().date_naive())
}

/// Extracts the original filename from a tokenized download URL.
///
/// The object name travels percent-encoded as the last path segment of the
/// URL (`uploads%2F{uid}%2F{filename}`); decoding it yields the namespaced
/// object path, whose final segment is the filename.
pub fn filename_from_url(raw: &str) -> Option<String> {
    let parsed = Url::parse(raw).ok()?;
    let last = parsed.path_segments()?.last()?;
    let object_path = percent_decode_str(last).decode_utf8().ok()?;
    object_path
        .split('/')
        .last()
        .filter(|name| !name.is_empty())
        .map(|name| name.to_string())
}
