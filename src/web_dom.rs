/// `web-sys` implementations of the DOM seams
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{
    Document, Element, HtmlAnchorElement, HtmlElement, MutationObserver, MutationObserverInit,
    MutationRecord, Node, NodeList, Window,
};

use crate::dom::{ChangeCallback, PageDocument, PostNode, Rect, Scheduler, StructuralChange};
use crate::error::{ExtensionError, Result};

#[derive(Debug, Clone)]
pub struct WebNode(pub Node);

impl WebNode {
    fn element(&self) -> Result<&Element> {
        self.0
            .dyn_ref::<Element>()
            .ok_or_else(|| ExtensionError::dom("not an element"))
    }
}

fn node_list(list: NodeList) -> Vec<WebNode> {
    (0..list.length())
        .filter_map(|i| list.get(i))
        .map(WebNode)
        .collect()
}

impl PostNode for WebNode {
    fn same_node(&self, other: &Self) -> bool {
        self.0.is_same_node(Some(&other.0))
    }

    fn is_element(&self) -> bool {
        self.0.dyn_ref::<Element>().is_some()
    }

    fn is_connected(&self) -> bool {
        self.0.is_connected()
    }

    fn matches(&self, selector: &str) -> Result<bool> {
        Ok(self.element()?.matches(selector)?)
    }

    fn query_selector(&self, selector: &str) -> Result<Option<Self>> {
        let found = self.element()?.query_selector(selector)?;
        Ok(found.map(|el| WebNode(el.into())))
    }

    fn query_selector_all(&self, selector: &str) -> Result<Vec<Self>> {
        Ok(node_list(self.element()?.query_selector_all(selector)?))
    }

    fn inner_text(&self) -> String {
        match self.0.dyn_ref::<HtmlElement>() {
            Some(el) => el.inner_text(),
            None => self.0.text_content().unwrap_or_default(),
        }
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.element().ok()?.get_attribute(name)
    }

    fn href(&self) -> Option<String> {
        self.0
            .dyn_ref::<HtmlAnchorElement>()
            .map(|a| a.href())
            .filter(|href| !href.is_empty())
    }

    fn bounding_rect(&self) -> Result<Rect> {
        let rect = self.element()?.get_bounding_client_rect();
        Ok(Rect::new(rect.top(), rect.width(), rect.height()))
    }
}

/// Disconnects the observer when dropped
pub struct ObserverHandle {
    observer: MutationObserver,
    closure: Option<Closure<dyn FnMut(js_sys::Array, MutationObserver)>>,
}

impl Drop for ObserverHandle {
    fn drop(&mut self) {
        self.observer.disconnect();
        // The handle may be dropped from inside its own callback; free the
        // closure only after that callback has returned.
        if let Some(closure) = self.closure.take() {
            spawn_local(async move { drop(closure) });
        }
    }
}

#[derive(Debug, Clone)]
pub struct WebDocument {
    window: Window,
    document: Document,
}

impl WebDocument {
    pub fn from_window() -> Result<WebDocument> {
        let window = web_sys::window().ok_or_else(|| ExtensionError::dom("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| ExtensionError::dom("no document"))?;
        Ok(WebDocument { window, document })
    }
}

impl PageDocument for WebDocument {
    type Node = WebNode;
    type Subscription = ObserverHandle;

    fn query_all(&self, selector: &str) -> Result<Vec<WebNode>> {
        Ok(node_list(self.document.query_selector_all(selector)?))
    }

    fn observe_body(&self, mut on_change: ChangeCallback<WebNode>) -> Result<ObserverHandle> {
        let body = self
            .document
            .body()
            .ok_or_else(|| ExtensionError::dom("document has no body"))?;

        let closure = Closure::wrap(Box::new(move |records: js_sys::Array, _: MutationObserver| {
            let changes: Vec<StructuralChange<WebNode>> = records
                .iter()
                .filter_map(|record| record.dyn_into::<MutationRecord>().ok())
                .map(|record| StructuralChange {
                    added: node_list(record.added_nodes()),
                    removed: node_list(record.removed_nodes()),
                })
                .collect();
            on_change(changes);
        }) as Box<dyn FnMut(js_sys::Array, MutationObserver)>);

        let observer = MutationObserver::new(closure.as_ref().unchecked_ref())?;
        let options = MutationObserverInit::new();
        options.set_child_list(true);
        options.set_subtree(true);
        observer.observe_with_options(&body, &options)?;

        Ok(ObserverHandle {
            observer,
            closure: Some(closure),
        })
    }

    fn viewport_height(&self) -> f64 {
        self.window
            .inner_height()
            .ok()
            .and_then(|h| h.as_f64())
            .unwrap_or(0.0)
    }

    fn location_href(&self) -> String {
        self.window.location().href().unwrap_or_default()
    }
}

/// Browser timers take an i32; longer waits saturate instead of wrapping negative
fn timer_millis(ms: u32) -> i32 {
    i32::try_from(ms).unwrap_or(i32::MAX)
}

/// Clears the timeout when dropped
pub struct TimerHandle {
    window: Window,
    id: i32,
    closure: Option<Closure<dyn FnMut()>>,
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.window.clear_timeout_with_handle(self.id);
        if let Some(closure) = self.closure.take() {
            spawn_local(async move { drop(closure) });
        }
    }
}

/// Clears the interval when dropped
pub struct IntervalHandle {
    window: Window,
    id: i32,
    closure: Option<Closure<dyn FnMut()>>,
}

impl Drop for IntervalHandle {
    fn drop(&mut self) {
        self.window.clear_interval_with_handle(self.id);
        if let Some(closure) = self.closure.take() {
            spawn_local(async move { drop(closure) });
        }
    }
}

#[derive(Debug, Clone)]
pub struct WebScheduler {
    window: Window,
}

impl WebScheduler {
    pub fn from_window() -> Result<WebScheduler> {
        let window = web_sys::window().ok_or_else(|| ExtensionError::dom("no window"))?;
        Ok(WebScheduler { window })
    }
}

impl Scheduler for WebScheduler {
    type Timer = TimerHandle;
    type Interval = IntervalHandle;

    fn set_timeout(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) -> Result<TimerHandle> {
        let closure: Closure<dyn FnMut()> = Closure::once(move || callback());
        let id = self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().unchecked_ref(),
                timer_millis(delay_ms),
            )?;
        Ok(TimerHandle {
            window: self.window.clone(),
            id,
            closure: Some(closure),
        })
    }

    fn set_interval(&self, period_ms: u32, callback: Box<dyn FnMut()>) -> Result<IntervalHandle> {
        let closure = Closure::wrap(callback);
        let id = self
            .window
            .set_interval_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().unchecked_ref(),
                timer_millis(period_ms),
            )?;
        Ok(IntervalHandle {
            window: self.window.clone(),
            id,
            closure: Some(closure),
        })
    }
}
