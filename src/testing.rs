/// In-memory document and timers for unit tests
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::dom::{ChangeCallback, PageDocument, PostNode, Rect, Scheduler, StructuralChange};
use crate::error::{ExtensionError, Result};
use crate::site::resolve_href;

const BODY: usize = 0;

struct NodeEntry {
    tag: String,
    classes: Vec<String>,
    attrs: Vec<(String, String)>,
    text: String,
    parent: Option<usize>,
    children: Vec<usize>,
    rect: Option<Rect>,
    broken: bool,
}

impl NodeEntry {
    fn new(tag: &str) -> NodeEntry {
        NodeEntry {
            tag: tag.to_string(),
            classes: Vec::new(),
            attrs: Vec::new(),
            text: String::new(),
            parent: None,
            children: Vec::new(),
            rect: Some(Rect::new(0.0, 100.0, 100.0)),
            broken: false,
        }
    }

    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

struct Arena {
    nodes: Vec<NodeEntry>,
    base_url: String,
}

#[derive(Clone)]
pub struct FakeNode {
    arena: Rc<RefCell<Arena>>,
    id: usize,
}

impl fmt::Debug for FakeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let arena = self.arena.borrow();
        let entry = &arena.nodes[self.id];
        write!(f, "FakeNode#{}<{}.{}>", self.id, entry.tag, entry.classes.join("."))
    }
}

impl FakeNode {
    fn with_entry<R>(&self, f: impl FnOnce(&mut NodeEntry) -> R) -> R {
        let mut arena = self.arena.borrow_mut();
        f(&mut arena.nodes[self.id])
    }

    pub fn attr(self, name: &str, value: &str) -> FakeNode {
        self.with_entry(|e| e.attrs.push((name.to_string(), value.to_string())));
        self
    }

    pub fn text(self, text: &str) -> FakeNode {
        self.with_entry(|e| e.text = text.to_string());
        self
    }

    pub fn rect(self, top: f64, width: f64, height: f64) -> FakeNode {
        self.with_entry(|e| e.rect = Some(Rect::new(top, width, height)));
        self
    }

    /// Measuring this node fails, like a stale reference
    pub fn unmeasurable(self) -> FakeNode {
        self.with_entry(|e| e.rect = None);
        self
    }

    /// Every inspection of this node fails
    pub fn broken(self) -> FakeNode {
        self.with_entry(|e| e.broken = true);
        self
    }

    /// Attach children without notifying anyone; for building detached subtrees
    pub fn with_children(self, children: &[FakeNode]) -> FakeNode {
        for child in children {
            link(&self.arena, self.id, child.id);
        }
        self
    }

    fn check(&self) -> Result<()> {
        if self.arena.borrow().nodes[self.id].broken {
            Err(ExtensionError::dom("invalid node"))
        } else {
            Ok(())
        }
    }

    fn descendants(&self) -> Vec<usize> {
        let arena = self.arena.borrow();
        let mut out = Vec::new();
        let mut stack: Vec<usize> = arena.nodes[self.id].children.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(arena.nodes[id].children.iter().rev().copied());
        }
        out
    }

    fn node(&self, id: usize) -> FakeNode {
        FakeNode {
            arena: self.arena.clone(),
            id,
        }
    }
}

fn link(arena: &Rc<RefCell<Arena>>, parent: usize, child: usize) {
    let mut arena = arena.borrow_mut();
    if let Some(old) = arena.nodes[child].parent.take() {
        arena.nodes[old].children.retain(|&c| c != child);
    }
    arena.nodes[child].parent = Some(parent);
    arena.nodes[parent].children.push(child);
}

impl PostNode for FakeNode {
    fn same_node(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.arena, &other.arena) && self.id == other.id
    }

    fn is_element(&self) -> bool {
        self.arena.borrow().nodes[self.id].tag != "#text"
    }

    fn is_connected(&self) -> bool {
        let arena = self.arena.borrow();
        let mut current = self.id;
        loop {
            if current == BODY {
                return true;
            }
            match arena.nodes[current].parent {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    fn matches(&self, selector: &str) -> Result<bool> {
        self.check()?;
        let arena = self.arena.borrow();
        Ok(selector_matches(&arena, self.id, selector))
    }

    fn query_selector(&self, selector: &str) -> Result<Option<Self>> {
        Ok(self.query_selector_all(selector)?.into_iter().next())
    }

    fn query_selector_all(&self, selector: &str) -> Result<Vec<Self>> {
        self.check()?;
        let ids = self.descendants();
        let arena = self.arena.borrow();
        Ok(ids
            .into_iter()
            .filter(|&id| arena.nodes[id].tag != "#text" && selector_matches(&arena, id, selector))
            .map(|id| self.node(id))
            .collect())
    }

    fn inner_text(&self) -> String {
        let mut text = self.arena.borrow().nodes[self.id].text.clone();
        for id in self.descendants() {
            text.push_str(&self.arena.borrow().nodes[id].text);
        }
        text
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.arena.borrow().nodes[self.id].attr(name).map(str::to_string)
    }

    fn href(&self) -> Option<String> {
        let arena = self.arena.borrow();
        let entry = &arena.nodes[self.id];
        if entry.tag != "a" {
            return None;
        }
        entry.attr("href").map(|href| resolve_href(href, &arena.base_url))
    }

    fn bounding_rect(&self) -> Result<Rect> {
        self.arena.borrow().nodes[self.id]
            .rect
            .ok_or_else(|| ExtensionError::dom("node cannot be measured"))
    }
}

// Minimal selector support: compound selectors (tag, .class, [attr],
// [attr='v'], [attr*='v']) joined by descendant combinators, in comma lists.

enum AttrTest {
    Exists(String),
    Equals(String, String),
    Contains(String, String),
}

struct Compound {
    tag: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrTest>,
}

fn parse_compound(input: &str) -> Compound {
    let mut compound = Compound {
        tag: None,
        classes: Vec::new(),
        attrs: Vec::new(),
    };
    let mut rest = input;

    let tag_end = rest.find(|c: char| c == '.' || c == '[').unwrap_or(rest.len());
    if tag_end > 0 {
        compound.tag = Some(rest[..tag_end].to_string());
    }
    rest = &rest[tag_end..];

    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix('.') {
            let end = after.find(|c: char| c == '.' || c == '[').unwrap_or(after.len());
            compound.classes.push(after[..end].to_string());
            rest = &after[end..];
        } else if let Some(after) = rest.strip_prefix('[') {
            let end = after.find(']').unwrap_or(after.len());
            let body = &after[..end];
            let unquote = |v: &str| v.trim_matches(|c| c == '\'' || c == '"').to_string();
            let test = if let Some((name, value)) = body.split_once("*=") {
                AttrTest::Contains(name.to_string(), unquote(value))
            } else if let Some((name, value)) = body.split_once('=') {
                AttrTest::Equals(name.to_string(), unquote(value))
            } else {
                AttrTest::Exists(body.to_string())
            };
            compound.attrs.push(test);
            rest = after.get(end + 1..).unwrap_or("");
        } else {
            break;
        }
    }

    compound
}

fn compound_matches(entry: &NodeEntry, compound: &Compound) -> bool {
    if entry.tag == "#text" {
        return false;
    }
    if let Some(tag) = &compound.tag {
        if tag != "*" && *tag != entry.tag {
            return false;
        }
    }
    if !compound.classes.iter().all(|c| entry.classes.contains(c)) {
        return false;
    }
    compound.attrs.iter().all(|test| match test {
        AttrTest::Exists(name) => entry.attr(name).is_some(),
        AttrTest::Equals(name, value) => entry.attr(name) == Some(value.as_str()),
        AttrTest::Contains(name, value) => {
            entry.attr(name).map_or(false, |v| v.contains(value.as_str()))
        }
    })
}

fn selector_matches(arena: &Arena, id: usize, selector: &str) -> bool {
    selector.split(',').any(|complex| {
        let parts: Vec<Compound> = complex.split_whitespace().map(parse_compound).collect();
        let Some((last, ancestors)) = parts.split_last() else {
            return false;
        };
        if !compound_matches(&arena.nodes[id], last) {
            return false;
        }
        let mut current = arena.nodes[id].parent;
        for compound in ancestors.iter().rev() {
            loop {
                match current {
                    Some(ancestor) => {
                        current = arena.nodes[ancestor].parent;
                        if compound_matches(&arena.nodes[ancestor], compound) {
                            break;
                        }
                    }
                    None => return false,
                }
            }
        }
        true
    })
}

struct ObserverSlot {
    active: bool,
    callback: Option<ChangeCallback<FakeNode>>,
}

type Slots = Rc<RefCell<Vec<ObserverSlot>>>;

pub struct FakeSubscription {
    slots: Slots,
    index: usize,
}

impl Drop for FakeSubscription {
    fn drop(&mut self) {
        let callback = {
            let mut slots = self.slots.borrow_mut();
            slots[self.index].active = false;
            slots[self.index].callback.take()
        };
        drop(callback);
    }
}

/// A document whose body is node 0; mutations are queued until `flush`
pub struct FakeDocument {
    arena: Rc<RefCell<Arena>>,
    slots: Slots,
    pending: RefCell<Vec<StructuralChange<FakeNode>>>,
    viewport_height: Cell<f64>,
    href: RefCell<String>,
    fail_observe: Cell<bool>,
}

impl FakeDocument {
    pub fn new() -> Rc<FakeDocument> {
        let href = "https://www.linkedin.com/feed/".to_string();
        let arena = Arena {
            nodes: vec![NodeEntry::new("body")],
            base_url: href.clone(),
        };
        Rc::new(FakeDocument {
            arena: Rc::new(RefCell::new(arena)),
            slots: Rc::new(RefCell::new(Vec::new())),
            pending: RefCell::new(Vec::new()),
            viewport_height: Cell::new(800.0),
            href: RefCell::new(href),
            fail_observe: Cell::new(false),
        })
    }

    pub fn body(&self) -> FakeNode {
        FakeNode {
            arena: self.arena.clone(),
            id: BODY,
        }
    }

    /// Create a detached element from `tag.class.class`
    pub fn element(&self, descriptor: &str) -> FakeNode {
        let mut parts = descriptor.split('.');
        let tag = parts.next().unwrap_or("div");
        let mut entry = NodeEntry::new(tag);
        entry.classes = parts.map(str::to_string).collect();
        let mut arena = self.arena.borrow_mut();
        arena.nodes.push(entry);
        FakeNode {
            arena: self.arena.clone(),
            id: arena.nodes.len() - 1,
        }
    }

    pub fn text_node(&self, text: &str) -> FakeNode {
        let node = self.element("#text");
        node.text(text)
    }

    pub fn post(&self) -> FakeNode {
        self.element("div.feed-shared-update-v2")
    }

    /// Insert `child` under `parent`; queued as a change if `parent` is attached
    pub fn append(&self, parent: &FakeNode, child: &FakeNode) {
        link(&self.arena, parent.id, child.id);
        if parent.is_connected() {
            self.pending
                .borrow_mut()
                .push(StructuralChange::added(vec![child.clone()]));
        }
    }

    pub fn remove(&self, node: &FakeNode) {
        let was_connected = node.is_connected();
        {
            let mut arena = self.arena.borrow_mut();
            if let Some(parent) = arena.nodes[node.id].parent.take() {
                arena.nodes[parent].children.retain(|&c| c != node.id);
            }
        }
        if was_connected {
            self.pending
                .borrow_mut()
                .push(StructuralChange::removed(vec![node.clone()]));
        }
    }

    /// Detach a node without queuing a change, as a missed notification would
    pub fn detach_silently(&self, node: &FakeNode) {
        let mut arena = self.arena.borrow_mut();
        if let Some(parent) = arena.nodes[node.id].parent.take() {
            arena.nodes[parent].children.retain(|&c| c != node.id);
        }
    }

    /// Deliver an arbitrary batch to observers
    pub fn deliver(&self, batch: Vec<StructuralChange<FakeNode>>) {
        let count = self.slots.borrow().len();
        for index in 0..count {
            let callback = {
                let mut slots = self.slots.borrow_mut();
                if !slots[index].active {
                    continue;
                }
                slots[index].callback.take()
            };
            if let Some(mut callback) = callback {
                callback(batch.clone());
                let mut slots = self.slots.borrow_mut();
                if slots[index].active {
                    slots[index].callback = Some(callback);
                }
            }
        }
    }

    /// Deliver queued changes as one batch
    pub fn flush(&self) {
        let batch = std::mem::take(&mut *self.pending.borrow_mut());
        if !batch.is_empty() {
            self.deliver(batch);
        }
    }

    pub fn active_observers(&self) -> usize {
        self.slots.borrow().iter().filter(|s| s.active).count()
    }

    pub fn set_viewport_height(&self, height: f64) {
        self.viewport_height.set(height);
    }

    pub fn set_href(&self, href: &str) {
        *self.href.borrow_mut() = href.to_string();
        self.arena.borrow_mut().base_url = href.to_string();
    }

    pub fn fail_observe(&self) {
        self.fail_observe.set(true);
    }
}

impl PageDocument for Rc<FakeDocument> {
    type Node = FakeNode;
    type Subscription = FakeSubscription;

    fn query_all(&self, selector: &str) -> Result<Vec<FakeNode>> {
        self.body().query_selector_all(selector)
    }

    fn observe_body(&self, on_change: ChangeCallback<FakeNode>) -> Result<FakeSubscription> {
        if self.fail_observe.get() {
            return Err(ExtensionError::dom("observe failed"));
        }
        let mut slots = self.slots.borrow_mut();
        slots.push(ObserverSlot {
            active: true,
            callback: Some(on_change),
        });
        Ok(FakeSubscription {
            slots: self.slots.clone(),
            index: slots.len() - 1,
        })
    }

    fn viewport_height(&self) -> f64 {
        self.viewport_height.get()
    }

    fn location_href(&self) -> String {
        self.href.borrow().clone()
    }
}

type TimerSlots = Rc<RefCell<Vec<Option<Box<dyn FnOnce()>>>>>;

pub struct FakeTimer {
    slots: TimerSlots,
    index: usize,
}

impl Drop for FakeTimer {
    fn drop(&mut self) {
        let callback = self.slots.borrow_mut()[self.index].take();
        drop(callback);
    }
}

type IntervalSlots = Rc<RefCell<Vec<Option<Box<dyn FnMut()>>>>>;

pub struct FakeInterval {
    slots: IntervalSlots,
    index: usize,
}

impl Drop for FakeInterval {
    fn drop(&mut self) {
        let callback = self.slots.borrow_mut()[self.index].take();
        drop(callback);
    }
}

#[derive(Clone, Default)]
pub struct FakeScheduler {
    slots: TimerSlots,
    delays: Rc<RefCell<Vec<u32>>>,
    intervals: IntervalSlots,
}

impl FakeScheduler {
    pub fn new() -> FakeScheduler {
        FakeScheduler::default()
    }

    /// Fire every timer that has not been cleared
    pub fn fire_all(&self) {
        let count = self.slots.borrow().len();
        for index in 0..count {
            let callback = self.slots.borrow_mut()[index].take();
            if let Some(callback) = callback {
                callback();
            }
        }
    }

    pub fn pending(&self) -> usize {
        self.slots.borrow().iter().filter(|s| s.is_some()).count()
    }

    pub fn delays(&self) -> Vec<u32> {
        self.delays.borrow().clone()
    }

    /// Run every live interval once
    pub fn tick(&self) {
        let count = self.intervals.borrow().len();
        for index in 0..count {
            let callback = self.intervals.borrow_mut()[index].take();
            if let Some(mut callback) = callback {
                callback();
                self.intervals.borrow_mut()[index] = Some(callback);
            }
        }
    }

    pub fn live_intervals(&self) -> usize {
        self.intervals.borrow().iter().filter(|s| s.is_some()).count()
    }
}

impl Scheduler for FakeScheduler {
    type Timer = FakeTimer;
    type Interval = FakeInterval;

    fn set_interval(&self, period_ms: u32, callback: Box<dyn FnMut()>) -> Result<FakeInterval> {
        self.delays.borrow_mut().push(period_ms);
        let mut slots = self.intervals.borrow_mut();
        slots.push(Some(callback));
        Ok(FakeInterval {
            slots: self.intervals.clone(),
            index: slots.len() - 1,
        })
    }

    fn set_timeout(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) -> Result<FakeTimer> {
        self.delays.borrow_mut().push(delay_ms);
        let mut slots = self.slots.borrow_mut();
        slots.push(Some(callback));
        Ok(FakeTimer {
            slots: self.slots.clone(),
            index: slots.len() - 1,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_matching() {
        let doc = FakeDocument::new();
        let link = doc.element("a").attr("href", "/feed/update/urn:li:activity:1/");
        let title = doc.element("span.feed-shared-actor__title").with_children(&[link.clone()]);
        let post = doc.post().with_children(&[title]);
        doc.append(&doc.body(), &post);

        assert!(post.matches("div.feed-shared-update-v2").unwrap());
        assert!(link.matches("span.feed-shared-actor__title a").unwrap());
        assert!(link.matches("a.app-aware-link, a[href*='/feed/update/']").unwrap());
        assert!(!link.matches("a.app-aware-link").unwrap());
        assert_eq!(post.query_selector_all("a").unwrap().len(), 1);
    }

    #[test]
    fn test_connected_follows_parents() {
        let doc = FakeDocument::new();
        let child = doc.element("span");
        let post = doc.post().with_children(&[child.clone()]);

        assert!(!child.is_connected());
        doc.append(&doc.body(), &post);
        assert!(child.is_connected());
        doc.remove(&post);
        assert!(!child.is_connected());
    }

    #[test]
    fn test_dropped_subscription_stops_delivery() {
        let doc = FakeDocument::new();
        let seen = Rc::new(Cell::new(0));
        let counter = seen.clone();
        let subscription = doc
            .observe_body(Box::new(move |_| counter.set(counter.get() + 1)))
            .unwrap();

        doc.append(&doc.body(), &doc.post());
        doc.flush();
        drop(subscription);
        doc.append(&doc.body(), &doc.post());
        doc.flush();

        assert_eq!(seen.get(), 1);
        assert_eq!(doc.active_observers(), 0);
    }
}
