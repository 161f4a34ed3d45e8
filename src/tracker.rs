/// Live list of feed posts, kept current from structural-change batches
/// so lookups never rescan the whole document.
use std::cell::RefCell;
use std::rc::Rc;

use crate::dom::{PageDocument, PostNode, StructuralChange};
use crate::error::Result;

/// Posts currently attached to the page, in discovery order, unique by identity
#[derive(Debug, Clone)]
pub struct LiveCollection<N: PostNode> {
    posts: Vec<N>,
}

pub type SharedPosts<N> = Rc<RefCell<LiveCollection<N>>>;

impl<N: PostNode> LiveCollection<N> {
    pub fn new() -> Self {
        LiveCollection { posts: Vec::new() }
    }

    /// Replace the contents with a fresh document scan
    pub fn reset(&mut self, seed: Vec<N>) {
        self.posts.clear();
        for post in seed {
            self.insert(post);
        }
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn contains(&self, node: &N) -> bool {
        self.posts.iter().any(|p| p.same_node(node))
    }

    pub fn snapshot(&self) -> Vec<N> {
        self.posts.clone()
    }

    fn insert(&mut self, node: N) {
        if !self.contains(&node) {
            self.posts.push(node);
        }
    }

    fn forget(&mut self, node: &N) {
        self.posts.retain(|p| !p.same_node(node));
    }

    /// Fold one notification batch into the collection.
    ///
    /// A node that fails inspection is skipped; the rest of the batch still
    /// applies. Entries that are no longer attached are pruned at the end.
    pub fn apply_changes(&mut self, changes: &[StructuralChange<N>], selector: &str) {
        for change in changes {
            for node in &change.added {
                if let Err(e) = self.track_added(node, selector) {
                    log::debug!("Skipping added node: {}", e);
                }
            }
            for node in &change.removed {
                if let Err(e) = self.track_removed(node, selector) {
                    log::debug!("Skipping removed node: {}", e);
                }
            }
        }

        self.prune_detached();
    }

    fn track_added(&mut self, node: &N, selector: &str) -> Result<()> {
        if !node.is_element() {
            return Ok(());
        }
        if node.matches(selector)? {
            self.insert(node.clone());
        } else {
            for post in node.query_selector_all(selector)? {
                self.insert(post);
            }
        }
        Ok(())
    }

    fn track_removed(&mut self, node: &N, selector: &str) -> Result<()> {
        if !node.is_element() {
            return Ok(());
        }
        if node.matches(selector)? {
            self.forget(node);
        } else {
            for post in node.query_selector_all(selector)? {
                self.forget(&post);
            }
        }
        Ok(())
    }

    fn prune_detached(&mut self) {
        self.posts.retain(|p| p.is_connected());
    }
}

impl<N: PostNode> Default for LiveCollection<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Owns the live collection and the document subscription feeding it
pub struct PostSetTracker<D: PageDocument> {
    document: D,
    selector: String,
    posts: SharedPosts<D::Node>,
    subscription: Option<D::Subscription>,
}

impl<D: PageDocument> PostSetTracker<D> {
    pub fn new(document: D, selector: impl Into<String>) -> Self {
        PostSetTracker {
            document,
            selector: selector.into(),
            posts: Rc::new(RefCell::new(LiveCollection::new())),
            subscription: None,
        }
    }

    /// Seed from a full scan, then follow structural changes.
    ///
    /// Calling this again tears down the previous subscription first, which is
    /// what a single-page-app route change needs.
    pub fn start(&mut self) -> Result<()> {
        self.stop();

        let seed = self.document.query_all(&self.selector)?;
        self.posts.borrow_mut().reset(seed);

        let posts = self.posts.clone();
        let selector = self.selector.clone();
        let subscription = self.document.observe_body(Box::new(move |changes| {
            posts.borrow_mut().apply_changes(&changes, &selector);
        }))?;
        self.subscription = Some(subscription);

        log::info!("Tracking {} posts", self.posts.borrow().len());
        Ok(())
    }

    pub fn stop(&mut self) {
        if self.subscription.take().is_some() {
            log::debug!("Post tracking disconnected");
        }
    }

    pub fn is_observing(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }

    /// Shared handle for readers such as the extraction handler
    pub fn posts(&self) -> SharedPosts<D::Node> {
        self.posts.clone()
    }
}
