/// DOM seams used by the post tracking core.
///
/// The content script runs these against `web-sys` (see `web_dom`); unit
/// tests run them against an in-memory document.
use crate::error::Result;

/// Viewport-relative box of an element, as `getBoundingClientRect` reports it
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(top: f64, width: f64, height: f64) -> Rect {
        Rect { top, width, height }
    }

    /// Unrendered placeholders report a 0x0 box
    pub fn is_empty(&self) -> bool {
        self.width == 0.0 && self.height == 0.0
    }

    pub fn center_y(&self) -> f64 {
        self.top + self.height / 2.0
    }
}

/// A handle to a node owned by the page's document.
///
/// Handles are cheap to clone and compare by identity, never by content.
pub trait PostNode: Clone + 'static {
    fn same_node(&self, other: &Self) -> bool;

    /// Text and comment nodes are never posts
    fn is_element(&self) -> bool;

    fn is_connected(&self) -> bool;

    fn matches(&self, selector: &str) -> Result<bool>;

    fn query_selector(&self, selector: &str) -> Result<Option<Self>>;

    fn query_selector_all(&self, selector: &str) -> Result<Vec<Self>>;

    /// Rendered text, untrimmed
    fn inner_text(&self) -> String;

    fn attribute(&self, name: &str) -> Option<String>;

    /// The anchor's fully resolved href, if this is an anchor with one
    fn href(&self) -> Option<String>;

    fn bounding_rect(&self) -> Result<Rect>;
}

/// One batch entry from a structural-change notification
#[derive(Debug, Clone)]
pub struct StructuralChange<N> {
    pub added: Vec<N>,
    pub removed: Vec<N>,
}

impl<N> StructuralChange<N> {
    pub fn added(nodes: Vec<N>) -> StructuralChange<N> {
        StructuralChange {
            added: nodes,
            removed: Vec::new(),
        }
    }

    pub fn removed(nodes: Vec<N>) -> StructuralChange<N> {
        StructuralChange {
            added: Vec::new(),
            removed: nodes,
        }
    }
}

pub type ChangeCallback<N> = Box<dyn FnMut(Vec<StructuralChange<N>>)>;

/// The page the content script lives in
pub trait PageDocument: Clone + 'static {
    type Node: PostNode;
    /// Dropping the subscription disconnects it
    type Subscription: 'static;

    fn query_all(&self, selector: &str) -> Result<Vec<Self::Node>>;

    /// Subscribe to insertions and removals anywhere under `<body>`
    fn observe_body(&self, on_change: ChangeCallback<Self::Node>) -> Result<Self::Subscription>;

    fn viewport_height(&self) -> f64;

    fn location_href(&self) -> String;
}

/// Timers on the page's event loop
pub trait Scheduler: 'static {
    /// Dropping the timer clears it
    type Timer: 'static;
    /// Dropping the interval clears it
    type Interval: 'static;

    fn set_timeout(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) -> Result<Self::Timer>;

    fn set_interval(&self, period_ms: u32, callback: Box<dyn FnMut()>) -> Result<Self::Interval>;
}
