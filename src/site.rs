/// LinkedIn URL handling: target-site checks and permalink synthesis
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

pub const FEED_ORIGIN: &str = "https://www.linkedin.com";

static ACTIVITY_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"activity:([^,)\s]+)").expect("activity id pattern is valid"));

/// Pull the activity id out of a `data-urn` value
///
/// Algorithm:
/// 1. Find the first "activity:" token in the URN
/// 2. Take everything after it up to a comma, closing paren or whitespace
///
/// Examples:
/// - urn:li:activity:12345 → 12345
/// - urn:li:fsd_update:(urn:li:activity:777,MAIN_FEED) → 777
/// - urn:li:aggregate:abc → None
pub fn activity_id(urn: &str) -> Option<&str> {
    ACTIVITY_ID
        .captures(urn)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Canonical permalink for a feed activity
pub fn activity_permalink(id: &str) -> String {
    format!("{}/feed/update/urn:li:activity:{}", FEED_ORIGIN, id)
}

/// Resolve a possibly relative href against the page URL.
/// Unparseable input is returned unchanged.
pub fn resolve_href(href: &str, page_url: &str) -> String {
    match Url::parse(page_url).and_then(|base| base.join(href)) {
        Ok(resolved) => resolved.to_string(),
        Err(_) => href.to_string(),
    }
}

/// Whether a URL's host is `target_host` or one of its subdomains
pub fn is_target_page(url: &str, target_host: &str) -> bool {
    Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(|h| h.to_lowercase()))
        .map_or(false, |host| {
            host == target_host || host.ends_with(&format!(".{}", target_host))
        })
}

/// The popup only saves from the main LinkedIn site
pub fn is_savable_tab(url: &str) -> bool {
    url.starts_with(FEED_ORIGIN)
}
