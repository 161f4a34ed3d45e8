/// Folder, tag and text filtering over saved posts

use crate::post_data::SavedPostRecord;

/// What the popup and dashboard currently narrow the list down to
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostFilter {
    pub search: String,
    pub tag: Option<String>,
    pub folder: Option<String>,
}

/// A post's folder, with blank folders shown under the default
pub fn folder_of<'a>(post: &'a SavedPostRecord, default_folder: &'a str) -> &'a str {
    if post.folder.is_empty() {
        default_folder
    } else {
        &post.folder
    }
}

impl PostFilter {
    /// Folder first, then exact tag, then case-insensitive text search over
    /// content, author and tags
    pub fn matches(&self, post: &SavedPostRecord, default_folder: &str) -> bool {
        if let Some(folder) = &self.folder {
            if folder_of(post, default_folder) != folder {
                return false;
            }
        }

        if let Some(tag) = &self.tag {
            if !post.tags.iter().any(|t| t == tag) {
                return false;
            }
        }

        let query = self.search.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        post.content.to_lowercase().contains(&query)
            || post.author.to_lowercase().contains(&query)
            || post.tags.iter().any(|t| t.to_lowercase().contains(&query))
    }

    pub fn apply(&self, posts: &[SavedPostRecord], default_folder: &str) -> Vec<SavedPostRecord> {
        posts
            .iter()
            .filter(|post| self.matches(post, default_folder))
            .cloned()
            .collect()
    }
}

/// Distinct folders in order of first appearance
pub fn folders(posts: &[SavedPostRecord], default_folder: &str) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    posts
        .iter()
        .map(|post| folder_of(post, default_folder))
        .filter(|folder| seen.insert(folder.to_string()))
        .map(str::to_string)
        .collect()
}

/// Cut text to `max_chars` characters and mark the cut
pub fn preview(text: &str, max_chars: usize) -> String {
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}...", cut)
}
