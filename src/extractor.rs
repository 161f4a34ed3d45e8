/// Best-effort scraping of author, text and permalink from a feed post.
///
/// Every selector here mirrors LinkedIn's current markup and will drift when
/// the site changes.
use crate::dom::PostNode;
use crate::error::Result;
use crate::post_data::ExtractedPostData;
use crate::site::{activity_id, activity_permalink};

/// Post body, in priority order
pub const CONTENT_SELECTORS: [&str; 2] = [".feed-shared-update-v2__description", "span.break-words"];

/// Author name, in priority order
pub const AUTHOR_SELECTORS: [&str; 3] = [
    "span.feed-shared-actor__title a",
    "span.feed-shared-actor__name",
    "a.app-aware-link",
];

/// Visually rendered text hidden from assistive tech; often holds the name
pub const HIDDEN_SPAN_SELECTOR: &str = "span[aria-hidden='true']";

pub const PERMALINK_ANCHOR_SELECTOR: &str = "a.app-aware-link, a[href*='/feed/update/']";

pub const URN_ATTRIBUTE: &str = "data-urn";

/// Scrape one post. Returns `None` only when there is no post.
pub fn extract<N: PostNode>(post: Option<&N>, page_url: &str) -> Option<ExtractedPostData> {
    let post = post?;

    Some(ExtractedPostData {
        content: extract_content(post),
        author: extract_author(post),
        url: extract_url(post, page_url),
    })
}

fn first_text<N: PostNode>(post: &N, selector: &str) -> Option<String> {
    match post.query_selector(selector) {
        Ok(Some(el)) => Some(el.inner_text().trim().to_string()).filter(|t| !t.is_empty()),
        Ok(None) => None,
        Err(e) => {
            log::debug!("Selector {} failed: {}", selector, e);
            None
        }
    }
}

fn extract_content<N: PostNode>(post: &N) -> String {
    CONTENT_SELECTORS
        .iter()
        .find_map(|selector| first_text(post, selector))
        .unwrap_or_default()
}

fn extract_author<N: PostNode>(post: &N) -> String {
    AUTHOR_SELECTORS
        .iter()
        .find_map(|selector| first_text(post, selector))
        .or_else(|| hidden_span_author(post))
        .unwrap_or_default()
}

/// First hidden span whose trimmed text is 3..=49 characters long
fn hidden_span_author<N: PostNode>(post: &N) -> Option<String> {
    let spans = post.query_selector_all(HIDDEN_SPAN_SELECTOR).ok()?;
    spans.iter().find_map(|span| {
        let text = span.inner_text().trim().to_string();
        let len = text.chars().count();
        (len > 2 && len < 50).then_some(text)
    })
}

fn extract_url<N: PostNode>(post: &N, page_url: &str) -> String {
    match permalink(post) {
        Ok(Some(url)) => url,
        Ok(None) => page_url.to_string(),
        Err(e) => {
            log::debug!("Falling back to page URL: {}", e);
            page_url.to_string()
        }
    }
}

fn permalink<N: PostNode>(post: &N) -> Result<Option<String>> {
    if let Some(urn) = post.attribute(URN_ATTRIBUTE) {
        if let Some(id) = activity_id(&urn) {
            return Ok(Some(activity_permalink(id)));
        }
    }

    Ok(post
        .query_selector(PERMALINK_ANCHOR_SELECTOR)?
        .and_then(|anchor| anchor.href())
        .filter(|href| !href.is_empty()))
}
