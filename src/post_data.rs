/// Data structures for Post Organizer
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const EXTRACT_POST_ACTION: &str = "extract_post";

/// Fields scraped from a single feed post
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ExtractedPostData {
    pub content: String,
    pub author: String,
    pub url: String,
}

impl ExtractedPostData {
    pub fn new(content: String, author: String, url: String) -> ExtractedPostData {
        ExtractedPostData {
            content,
            author,
            url,
        }
    }

    /// True when at least one field carries something
    pub fn is_usable(&self) -> bool {
        !self.content.is_empty() || !self.author.is_empty() || !self.url.is_empty()
    }
}

/// A bookmarked post as persisted in `chrome.storage.local`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SavedPostRecord {
    #[serde(default = "new_record_id")]
    pub id: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub folder: String,
    #[serde(default)]
    pub saved_at: f64,
}

fn new_record_id() -> String {
    Uuid::new_v4().to_string()
}

impl SavedPostRecord {
    pub fn from_extracted(
        data: ExtractedPostData,
        tags: Vec<String>,
        folder: String,
        saved_at: f64,
    ) -> SavedPostRecord {
        SavedPostRecord {
            id: new_record_id(),
            content: data.content,
            author: data.author,
            url: data.url,
            tags,
            folder,
            saved_at,
        }
    }
}

/// Message sent from the popup to the content script
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtractRequest {
    pub action: String,
}

impl ExtractRequest {
    pub fn extract_post() -> ExtractRequest {
        ExtractRequest {
            action: EXTRACT_POST_ACTION.to_string(),
        }
    }

    pub fn is_extract_post(&self) -> bool {
        self.action == EXTRACT_POST_ACTION
    }
}

/// Reply to an `extract_post` request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExtractResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_data: Option<ExtractedPostData>,
}

impl ExtractResponse {
    pub fn found(post_data: ExtractedPostData) -> ExtractResponse {
        ExtractResponse {
            success: true,
            post_data: Some(post_data),
        }
    }

    pub fn failure() -> ExtractResponse {
        ExtractResponse {
            success: false,
            post_data: None,
        }
    }

    /// The extracted data, only when the request succeeded
    pub fn into_post_data(self) -> Option<ExtractedPostData> {
        if self.success { self.post_data } else { None }
    }
}
