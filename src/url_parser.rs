//! Telegram post URL parsing
//!
//! Extracts the channel username and message id out of a public post URL such
//! as `https://t.me/examplechan/99`. Pure string work, no network access.

use regex::Regex;
use std::sync::OnceLock;

use crate::errors::FetchError;

/// Accepted shape: `https://t.me/<channel>/<digits>` with an optional
/// trailing slash or query string (share links append `?single`).
const POST_URL_PATTERN: &str = r"^https://t\.me/([A-Za-z0-9_]+)/(\d+)/?(?:\?.*)?$";

fn post_url_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(POST_URL_PATTERN).unwrap())
}

/// Parse a Telegram post URL into `(channel_username, message_id)`
///
/// Fails with [`FetchError::InvalidUrl`] for anything that does not match the
/// accepted pattern, including message ids too large for Telegram.
pub fn parse_post_url(url: &str) -> Result<(String, i32), FetchError> {
    let captures = post_url_regex()
        .captures(url)
        .ok_or_else(|| FetchError::invalid_url(url))?;

    let channel = captures[1].to_string();
    let message_id: i32 = captures[2]
        .parse()
        .map_err(|_| FetchError::invalid_url(url))?;

    Ok((channel, message_id))
}
