/// Saved post collection as stored in chrome.storage.local

use crate::post_data::SavedPostRecord;
use serde::{Deserialize, Serialize};

/// Every saved post in insertion order. Serialized as a bare JSON array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SavedPosts {
    pub posts: Vec<SavedPostRecord>,
}

impl SavedPosts {
    pub fn new() -> Self {
        SavedPosts { posts: Vec::new() }
    }

    /// Append a record. Saving the same post twice keeps both records.
    pub fn add_post(&mut self, post: SavedPostRecord) {
        self.posts.push(post);
    }

    pub fn remove_post(&mut self, post_id: &str) -> bool {
        let original_len = self.posts.len();
        self.posts.retain(|p| p.id != post_id);
        self.posts.len() < original_len
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// Most recently saved first, the order both pages display
    pub fn newest_first(&self) -> Vec<SavedPostRecord> {
        self.posts.iter().rev().cloned().collect()
    }
}

impl Default for SavedPosts {
    fn default() -> Self {
        Self::new()
    }
}
