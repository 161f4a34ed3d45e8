/// Typed wrappers over the chrome.* bridge

use serde::Deserialize;
use wasm_bindgen::prelude::*;

use crate::config::{ExtensionConfig, SETTINGS_STORAGE_KEY};
use crate::error::{self, ExtensionError};
use crate::post_data::{ExtractRequest, ExtractResponse};
use crate::storage::SavedPosts;

// Import JS bridge functions
#[wasm_bindgen(module = "/chrome.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn getStorage(key: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn setStorage(key: &str, value: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn getActiveTab() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn sendTabMessage(tab_id: i32, message: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn injectContentScript(tab_id: i32) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn openDashboard() -> Result<(), JsValue>;
}

const DARK_MODE_KEY: &str = "darkMode";
const DARK_MODE_CLASS: &str = "dark-mode";

#[derive(Debug, Clone, Deserialize)]
pub struct ActiveTab {
    pub id: i32,
    #[serde(default)]
    pub url: String,
}

async fn read_key(key: &str) -> error::Result<Option<JsValue>> {
    let value = getStorage(key)
        .await
        .map_err(|e| ExtensionError::Storage(format!("{:?}", e)))?;
    Ok((!value.is_null() && !value.is_undefined()).then_some(value))
}

/// Settings from storage, or defaults when absent or unreadable
pub async fn load_config() -> ExtensionConfig {
    let stored = match read_key(SETTINGS_STORAGE_KEY).await {
        Ok(Some(value)) => serde_wasm_bindgen::from_value::<serde_json::Value>(value).ok(),
        Ok(None) => None,
        Err(e) => {
            log::warn!("Could not read settings: {}", e);
            None
        }
    };
    ExtensionConfig::from_stored(stored)
}

pub async fn load_posts(key: &str) -> error::Result<SavedPosts> {
    match read_key(key).await? {
        Some(value) => Ok(serde_wasm_bindgen::from_value(value)?),
        None => Ok(SavedPosts::new()),
    }
}

pub async fn save_posts(key: &str, posts: &SavedPosts) -> error::Result<()> {
    let value = serde_wasm_bindgen::to_value(posts)?;
    setStorage(key, value)
        .await
        .map_err(|e| ExtensionError::Storage(format!("{:?}", e)))
}

pub async fn active_tab() -> error::Result<Option<ActiveTab>> {
    let tab = getActiveTab().await?;
    if tab.is_null() || tab.is_undefined() {
        return Ok(None);
    }
    Ok(Some(serde_wasm_bindgen::from_value(tab)?))
}

/// Ask the tab's content script for the post in view.
/// A tab without a listener counts as a failed extraction.
pub async fn request_post(tab_id: i32) -> error::Result<ExtractResponse> {
    let message = serde_wasm_bindgen::to_value(&ExtractRequest::extract_post())?;
    let reply = sendTabMessage(tab_id, message).await?;
    if reply.is_null() || reply.is_undefined() {
        return Ok(ExtractResponse::failure());
    }
    Ok(serde_wasm_bindgen::from_value(reply).unwrap_or_else(|e| {
        log::warn!("Malformed extract_post reply: {}", e);
        ExtractResponse::failure()
    }))
}

pub async fn inject_content_script(tab_id: i32) -> error::Result<()> {
    Ok(injectContentScript(tab_id).await?)
}

pub async fn open_dashboard() -> error::Result<()> {
    Ok(openDashboard().await?)
}

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok()?
}

fn set_body_class(enabled: bool) {
    let body = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.body());
    if let Some(body) = body {
        let _ = body.class_list().toggle_with_force(DARK_MODE_CLASS, enabled);
    }
}

/// Apply the persisted dark mode preference; returns whether it is on
pub fn apply_dark_mode() -> bool {
    let enabled = local_storage()
        .and_then(|s| s.get_item(DARK_MODE_KEY).ok().flatten())
        .map_or(false, |v| v == "true");
    set_body_class(enabled);
    enabled
}

pub fn set_dark_mode(enabled: bool) {
    set_body_class(enabled);
    if let Some(storage) = local_storage() {
        if storage
            .set_item(DARK_MODE_KEY, if enabled { "true" } else { "false" })
            .is_err()
        {
            log::warn!("Could not persist dark mode preference");
        }
    }
}
