/// LinkedIn Post Organizer - Chrome Extension for saving and tagging feed posts
/// Built with Rust + WASM + Yew

mod chrome;
mod config;
mod content;
mod dom;
mod error;
mod extractor;
mod filter;
mod handler;
mod locator;
mod navigation;
mod post_data;
mod site;
mod storage;
mod tagging;
mod tracker;
mod web_dom;
pub mod ui;

#[cfg(test)]
mod testing;

pub use config::ExtensionConfig;
pub use dom::{PageDocument, PostNode, Rect, Scheduler, StructuralChange};
pub use error::ExtensionError;
pub use extractor::extract;
pub use handler::{ExtractionRequestHandler, PendingExtraction};
pub use locator::find_closest;
pub use post_data::{ExtractRequest, ExtractResponse, ExtractedPostData, SavedPostRecord};
pub use tracker::PostSetTracker;
pub use web_dom::{WebDocument, WebNode, WebScheduler};

use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

// Re-export the permalink rule for JavaScript access
#[wasm_bindgen]
pub fn activity_permalink(urn: &str) -> Option<String> {
    site::activity_id(urn).map(site::activity_permalink)
}

// Start tracking posts and answering extract_post in a LinkedIn tab
#[wasm_bindgen]
pub fn start_content_script() {
    spawn_local(async {
        let config = chrome::load_config().await;
        content::install(config);
    });
}

// Start the Yew app for the popup
#[wasm_bindgen]
pub fn start_popup() {
    yew::Renderer::<ui::popup::App>::new().render();
}

// Start the Yew app for the saved posts dashboard
#[wasm_bindgen]
pub fn start_dashboard() {
    yew::Renderer::<ui::dashboard::Dashboard>::new().render();
}
