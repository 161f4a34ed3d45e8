/// Content script: tracks posts on the LinkedIn page and answers the popup
use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use crate::config::ExtensionConfig;
use crate::dom::PageDocument;
use crate::error::Result;
use crate::handler::ExtractionRequestHandler;
use crate::navigation::watch_navigation;
use crate::post_data::ExtractRequest;
use crate::site::is_target_page;
use crate::tracker::PostSetTracker;
use crate::web_dom::{IntervalHandle, WebDocument, WebScheduler};

// Import JS bridge functions
#[wasm_bindgen(module = "/content.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    fn onExtractRequest(handler: &js_sys::Function) -> std::result::Result<(), JsValue>;
}

type Handler = ExtractionRequestHandler<WebDocument, WebScheduler>;

/// Everything the content script keeps alive for one page context.
/// Dropping it disconnects the observer and stops navigation polling.
pub struct ContentScript {
    tracker: Rc<RefCell<PostSetTracker<WebDocument>>>,
    _navigation: Option<IntervalHandle>,
    _listener: Closure<dyn FnMut(JsValue) -> JsValue>,
}

thread_local! {
    static ACTIVE: RefCell<Option<ContentScript>> = const { RefCell::new(None) };
}

impl ContentScript {
    pub fn start(config: &ExtensionConfig) -> Result<ContentScript> {
        let document = WebDocument::from_window()?;
        let scheduler = WebScheduler::from_window()?;

        let mut tracker = PostSetTracker::new(document.clone(), config.post_selector.clone());
        if let Err(e) = tracker.start() {
            // Extraction then never finds a post instead of breaking the page
            log::warn!("Post tracking did not start: {}", e);
        }
        let handler = Rc::new(ExtractionRequestHandler::new(
            document.clone(),
            scheduler.clone(),
            &tracker,
            config.extract_timeout_ms,
        ));
        let tracker = Rc::new(RefCell::new(tracker));

        let listener = message_listener(handler);
        onExtractRequest(listener.as_ref().unchecked_ref())?;

        let navigation = {
            let tracker = tracker.clone();
            watch_navigation(document, &scheduler, config.navigation_poll_ms, move |_| {
                if let Err(e) = tracker.borrow_mut().start() {
                    log::warn!("Post tracking did not restart: {}", e);
                }
            })
        };
        let navigation = match navigation {
            Ok(interval) => Some(interval),
            Err(e) => {
                log::warn!("Navigation polling unavailable: {}", e);
                None
            }
        };

        Ok(ContentScript {
            tracker,
            _navigation: navigation,
            _listener: listener,
        })
    }

    pub fn tracked_posts(&self) -> usize {
        self.tracker.borrow().posts().borrow().len()
    }
}

impl Drop for ContentScript {
    fn drop(&mut self) {
        self.tracker.borrow_mut().stop();
    }
}

/// Turn runtime messages into promises of `ExtractResponse`, or `undefined`
/// for messages this script does not answer
fn message_listener(handler: Rc<Handler>) -> Closure<dyn FnMut(JsValue) -> JsValue> {
    Closure::wrap(Box::new(move |message: JsValue| -> JsValue {
        let request: ExtractRequest = match serde_wasm_bindgen::from_value(message) {
            Ok(request) => request,
            Err(_) => return JsValue::UNDEFINED,
        };
        match handler.handle(&request) {
            Some(pending) => future_to_promise(async move {
                let response = pending.await;
                log::debug!("extract_post answered, success={}", response.success);
                Ok(serde_wasm_bindgen::to_value(&response)?)
            })
            .into(),
            None => JsValue::UNDEFINED,
        }
    }) as Box<dyn FnMut(JsValue) -> JsValue>)
}

/// Start (or restart, on re-injection) the content script for this page
pub fn install(config: ExtensionConfig) {
    let href = WebDocument::from_window()
        .map(|d| d.location_href())
        .unwrap_or_default();
    if !is_target_page(&href, &config.target_host) {
        log::debug!("Not a {} page, content script idle: {}", config.target_host, href);
        return;
    }
    match ContentScript::start(&config) {
        Ok(script) => {
            log::info!("Content script ready on {} ({} posts)", href, script.tracked_posts());
            // The previous instance, if any, is dropped here and disconnects itself
            ACTIVE.with(|active| active.replace(Some(script)));
        }
        Err(e) => log::warn!("Content script failed to start: {}", e),
    }
}
