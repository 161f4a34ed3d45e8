/// Tag input handling and the remote tag suggestion service
use serde::{Deserialize, Serialize};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response};

use crate::error::{ExtensionError, Result};

#[derive(Debug, Serialize)]
pub struct TagSuggestionRequest<'a> {
    pub text: &'a str,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct TagSuggestionResponse {
    #[serde(default)]
    pub auto_tags: Vec<String>,
}

/// Split comma-separated tag input, dropping blanks
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Append `tag` to the tag input unless it is already listed
pub fn add_tag_to_input(input: &str, tag: &str) -> String {
    let mut tags = parse_tags(input);
    if !tags.iter().any(|t| t == tag) {
        tags.push(tag.to_string());
    }
    tags.join(", ")
}

/// Decides when typing in the tag box should ask for suggestions
#[derive(Debug, Clone, Default)]
pub struct SuggestionGate {
    last_content: Option<String>,
}

impl SuggestionGate {
    pub fn new() -> SuggestionGate {
        SuggestionGate::default()
    }

    /// Whether enough has been typed to ask for suggestions
    pub fn input_ready(input: &str, min_len: usize) -> bool {
        input.trim().chars().count() >= min_len
    }

    /// True for non-empty content not already sent; remembers it
    pub fn should_request(&mut self, content: &str) -> bool {
        if content.is_empty() || self.last_content.as_deref() == Some(content) {
            return false;
        }
        self.last_content = Some(content.to_string());
        true
    }
}

pub struct TagSuggestionClient {
    endpoint: String,
}

impl TagSuggestionClient {
    pub fn new(endpoint: impl Into<String>) -> TagSuggestionClient {
        TagSuggestionClient {
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn suggest(&self, text: &str) -> Result<Vec<String>> {
        let body = serde_json::to_string(&TagSuggestionRequest { text })?;

        let init = RequestInit::new();
        init.set_method("POST");
        init.set_mode(RequestMode::Cors);
        init.set_body(&JsValue::from_str(&body));

        let request = Request::new_with_str_and_init(&self.endpoint, &init)?;
        request.headers().set("Content-Type", "application/json")?;

        let window = web_sys::window().ok_or_else(|| ExtensionError::dom("no window"))?;
        let response: Response = JsFuture::from(window.fetch_with_request(&request))
            .await?
            .dyn_into()?;
        if !response.ok() {
            return Err(ExtensionError::Http {
                status: response.status(),
            });
        }

        let json = JsFuture::from(response.json()?).await?;
        let parsed: TagSuggestionResponse = serde_wasm_bindgen::from_value(json)?;
        log::debug!("Received {} tag suggestions", parsed.auto_tags.len());
        Ok(parsed.auto_tags)
    }
}
