/// Extension settings with defaults matching the current LinkedIn markup
use serde::{Deserialize, Serialize};

pub const SETTINGS_STORAGE_KEY: &str = "postOrganizerSettings";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExtensionConfig {
    /// CSS selector identifying a single feed post
    pub post_selector: String,
    /// Upper bound on the deferred extraction wait
    pub extract_timeout_ms: u32,
    /// How often the content script compares `location.href`
    pub navigation_poll_ms: u32,
    pub tag_endpoint: String,
    pub target_host: String,
    pub posts_storage_key: String,
    pub default_folder: String,
    /// Tag input shorter than this never triggers a suggestion request
    pub min_tag_input_len: usize,
}

impl Default for ExtensionConfig {
    fn default() -> Self {
        ExtensionConfig {
            post_selector: "div.feed-shared-update-v2".to_string(),
            extract_timeout_ms: 5000,
            navigation_poll_ms: 1000,
            tag_endpoint: "https://web-production-6d5d1.up.railway.app/extract_tags".to_string(),
            target_host: "linkedin.com".to_string(),
            posts_storage_key: "savedPosts".to_string(),
            default_folder: "Uncategorized".to_string(),
            min_tag_input_len: 2,
        }
    }
}

impl ExtensionConfig {
    /// Build a config from a stored settings object, keeping defaults for
    /// anything missing. Invalid settings are ignored entirely.
    pub fn from_stored(stored: Option<serde_json::Value>) -> Self {
        match stored {
            None | Some(serde_json::Value::Null) => ExtensionConfig::default(),
            Some(value) => serde_json::from_value(value).unwrap_or_else(|e| {
                log::warn!("Ignoring invalid settings: {}", e);
                ExtensionConfig::default()
            }),
        }
    }
}
