/// Popup UI: save the post in view, browse and filter saved posts

use yew::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use patternfly_yew::prelude::*;
use crate::chrome;
use crate::config::ExtensionConfig;
use crate::filter::{preview, PostFilter};
use crate::post_data::{ExtractedPostData, SavedPostRecord};
use crate::site::is_savable_tab;
use crate::storage::SavedPosts;
use crate::tagging::{add_tag_to_input, parse_tags, SuggestionGate, TagSuggestionClient};
use crate::ui::components::{ActiveFilter, CardStyle, PostCard, SearchBox, TagList};

const CONNECT_ERROR: &str = "Couldn't connect to the LinkedIn page. Please refresh the tab and try again.";
const REFRESH_ERROR: &str = "Please refresh the LinkedIn tab and try again.";
const NOT_LINKEDIN: &str = "Please open a LinkedIn post or feed page to save.";
const SUGGESTION_ERROR: &str = "Couldn't fetch suggestions";

#[derive(Clone, PartialEq)]
enum AppState {
    Idle,
    Loading(String),
    Saved(String),
    Warning(String),
    Error(String),
}

#[derive(Clone, PartialEq)]
enum Suggestions {
    None,
    Loading,
    Loaded(Vec<String>),
    Failed,
}

fn input_value(e: &InputEvent) -> Option<String> {
    e.target_dyn_into::<HtmlInputElement>().map(|input| input.value())
}

#[function_component(App)]
pub fn app() -> Html {
    let state = use_state(|| AppState::Idle);
    let config = use_state(ExtensionConfig::default);
    let posts = use_state(SavedPosts::new);
    let search_query = use_state(String::new);
    let tag_filter = use_state(|| None::<String>);
    let tags_input = use_state(String::new);
    let folder_input = use_state(String::new);
    let suggestions = use_state(|| Suggestions::None);
    let gate = use_mut_ref(SuggestionGate::new);
    let dark_mode = use_state(|| false);

    // Load settings, saved posts and theme on mount
    {
        let state = state.clone();
        let config = config.clone();
        let posts = posts.clone();
        let dark_mode = dark_mode.clone();

        use_effect_with((), move |_| {
            dark_mode.set(chrome::apply_dark_mode());
            spawn_local(async move {
                let loaded = chrome::load_config().await;
                match chrome::load_posts(&loaded.posts_storage_key).await {
                    Ok(saved) => posts.set(saved),
                    Err(e) => state.set(AppState::Error(format!("Failed to load saved posts: {}", e))),
                }
                config.set(loaded);
            });
            || ()
        });
    }

    // Save handler
    let on_save = {
        let state = state.clone();
        let config = config.clone();
        let posts = posts.clone();
        let tags_input = tags_input.clone();
        let folder_input = folder_input.clone();

        Callback::from(move |_| {
            let state = state.clone();
            let config = (*config).clone();
            let posts = posts.clone();
            let tags = parse_tags(&tags_input);
            let folder = match folder_input.trim() {
                "" => config.default_folder.clone(),
                folder => folder.to_string(),
            };
            let tags_input = tags_input.clone();
            let folder_input = folder_input.clone();

            state.set(AppState::Loading("Saving post...".to_string()));

            spawn_local(async move {
                let tab = match chrome::active_tab().await {
                    Ok(Some(tab)) if is_savable_tab(&tab.url) => tab,
                    Ok(_) => {
                        state.set(AppState::Warning(NOT_LINKEDIN.to_string()));
                        return;
                    }
                    Err(e) => {
                        state.set(AppState::Error(format!("Failed to get tab: {}", e)));
                        return;
                    }
                };

                let data = match extract_with_reinjection(tab.id).await {
                    Ok(data) => data,
                    Err(msg) => {
                        state.set(AppState::Error(msg));
                        return;
                    }
                };

                let record = SavedPostRecord::from_extracted(data, tags, folder, js_sys::Date::now());
                let snippet = preview(&record.content, 50);
                match save_post(&config.posts_storage_key, record).await {
                    Ok(saved) => {
                        posts.set(saved);
                        tags_input.set(String::new());
                        folder_input.set(String::new());
                        state.set(AppState::Saved(format!("Saved: {}", snippet)));
                    }
                    Err(e) => {
                        state.set(AppState::Error(format!("Failed to save: {}", e)));
                    }
                }
            });
        })
    };

    // Tag input handler, asks for suggestions once enough is typed
    let on_tags_input = {
        let config = config.clone();
        let tags_input = tags_input.clone();
        let suggestions = suggestions.clone();
        let gate = gate.clone();

        Callback::from(move |e: InputEvent| {
            let Some(value) = input_value(&e) else {
                return;
            };
            let ready = SuggestionGate::input_ready(&value, config.min_tag_input_len);
            tags_input.set(value);
            if !ready {
                return;
            }

            let suggestions = suggestions.clone();
            let gate = gate.clone();
            let client = TagSuggestionClient::new(config.tag_endpoint.clone());

            spawn_local(async move {
                let content = match current_post_content().await {
                    Some(content) => content,
                    None => return,
                };
                if !gate.borrow_mut().should_request(&content) {
                    return;
                }

                suggestions.set(Suggestions::Loading);
                match client.suggest(&content).await {
                    Ok(tags) => suggestions.set(Suggestions::Loaded(tags)),
                    Err(e) => {
                        log::warn!("Tag suggestions from {} failed: {}", client.endpoint(), e);
                        suggestions.set(Suggestions::Failed);
                    }
                }
            });
        })
    };

    let on_suggestion_click = {
        let tags_input = tags_input.clone();
        Callback::from(move |tag: String| {
            tags_input.set(add_tag_to_input(&tags_input, &tag));
        })
    };

    let on_folder_input = {
        let folder_input = folder_input.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(value) = input_value(&e) {
                folder_input.set(value);
            }
        })
    };

    let on_search_input = {
        let search_query = search_query.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(value) = input_value(&e) {
                search_query.set(value);
            }
        })
    };

    let on_tag_click = {
        let tag_filter = tag_filter.clone();
        Callback::from(move |tag: String| tag_filter.set(Some(tag)))
    };

    let on_clear_filter = {
        let tag_filter = tag_filter.clone();
        Callback::from(move |_: ()| tag_filter.set(None))
    };

    // Delete handler
    let on_delete = {
        let state = state.clone();
        let config = config.clone();
        let posts = posts.clone();

        Callback::from(move |post_id: String| {
            let state = state.clone();
            let posts = posts.clone();
            let key = config.posts_storage_key.clone();
            spawn_local(async move {
                match delete_post(&key, &post_id).await {
                    Ok(remaining) => posts.set(remaining),
                    Err(e) => state.set(AppState::Error(format!("Failed to delete: {}", e))),
                }
            });
        })
    };

    let on_open_dashboard = Callback::from(move |_| {
        spawn_local(async move {
            if let Err(e) = chrome::open_dashboard().await {
                log::warn!("Could not open dashboard: {}", e);
            }
        });
    });

    let on_toggle_dark = {
        let dark_mode = dark_mode.clone();
        Callback::from(move |_| {
            let enabled = !*dark_mode;
            chrome::set_dark_mode(enabled);
            dark_mode.set(enabled);
        })
    };

    let is_busy = matches!(*state, AppState::Loading(_));

    let filter = PostFilter {
        search: (*search_query).clone(),
        tag: (*tag_filter).clone(),
        folder: None,
    };
    let visible = filter.apply(&posts.newest_first(), &config.default_folder);

    html! {
        <div class="padding-20">
            <div class="popup-header">
                <h1 class="popup-title">{"LinkedIn Post Saver"}</h1>
                <Button onclick={on_toggle_dark} variant={ButtonVariant::Plain} size={ButtonSize::Small}>
                    {if *dark_mode { "☀️" } else { "🌙" }}
                </Button>
            </div>

            <div class="flex-column-gap">
                <input
                    type="text"
                    placeholder="Tags (comma separated)"
                    value={(*tags_input).clone()}
                    oninput={on_tags_input}
                    class="text-input"
                />

                {match &*suggestions {
                    Suggestions::Loading => html! { <p class="suggestion-status">{"Fetching suggestions..."}</p> },
                    Suggestions::Loaded(tags) => html! {
                        <div class="suggestions">
                            <span class="suggestion-label">{"Suggested:"}</span>
                            <TagList
                                tags={tags.clone()}
                                on_click={on_suggestion_click}
                                class={"tag suggestion-tag".to_string()}
                            />
                        </div>
                    },
                    Suggestions::Failed => html! { <p class="suggestion-status">{SUGGESTION_ERROR}</p> },
                    Suggestions::None => html! {},
                }}

                <input
                    type="text"
                    placeholder={format!("Folder (default: {})", config.default_folder)}
                    value={(*folder_input).clone()}
                    oninput={on_folder_input}
                    class="text-input"
                />

                <Button onclick={on_save} disabled={is_busy} variant={ButtonVariant::Primary} block={true}>
                    {"💾 Save Current Post"}
                </Button>
                <Button onclick={on_open_dashboard} variant={ButtonVariant::Secondary} block={true}>
                    {"📂 Open Dashboard"}
                </Button>
            </div>

            // Status display
            {match &*state {
                AppState::Loading(msg) => html! {
                    <div class="loading-text-center">
                        <Spinner />
                        <p class="loading-text">{msg}</p>
                    </div>
                },
                AppState::Saved(msg) => html! {
                    <div class="message-top-margin">
                        <Alert r#type={AlertType::Success} title={msg.clone()} inline={true}>
                        </Alert>
                    </div>
                },
                AppState::Warning(msg) => html! {
                    <div class="message-top-margin">
                        <Alert r#type={AlertType::Warning} title={msg.clone()} inline={true}>
                        </Alert>
                    </div>
                },
                AppState::Error(err) => html! {
                    <div class="message-top-margin">
                        <Alert r#type={AlertType::Danger} title={"Error"} inline={true}>
                            {err.clone()}
                        </Alert>
                    </div>
                },
                AppState::Idle => html! {}
            }}

            <h2 class="section-title">{format!("Saved Posts ({})", posts.len())}</h2>

            <SearchBox
                value={(*search_query).clone()}
                placeholder={"Search saved posts...".to_string()}
                oninput={on_search_input}
            />
            <ActiveFilter tag={(*tag_filter).clone()} on_clear={on_clear_filter} />

            <div class="posts-list">
                if visible.is_empty() {
                    <p class="empty-text">{empty_list_message(posts.len())}</p>
                } else {
                    {for visible.into_iter().map(|post| html! {
                        <PostCard
                            key={post.id.clone()}
                            post={post.clone()}
                            style={CardStyle::Popup}
                            default_folder={config.default_folder.clone()}
                            on_tag_click={on_tag_click.clone()}
                            on_delete={Some(on_delete.clone())}
                        />
                    })}
                }
            </div>
        </div>
    }
}

// Helper functions

/// Ask the tab for its post; on failure inject the content script once and retry
async fn extract_with_reinjection(tab_id: i32) -> Result<ExtractedPostData, String> {
    match chrome::request_post(tab_id).await {
        Ok(response) => {
            if let Some(data) = response.into_post_data() {
                return Ok(data);
            }
        }
        Err(e) => log::info!("No content script answered: {}", e),
    }

    if let Err(e) = chrome::inject_content_script(tab_id).await {
        log::warn!("Content script injection failed: {}", e);
        return Err(REFRESH_ERROR.to_string());
    }

    match chrome::request_post(tab_id).await {
        Ok(response) => response.into_post_data().ok_or_else(|| CONNECT_ERROR.to_string()),
        Err(e) => {
            log::warn!("Retry after injection failed: {}", e);
            Err(CONNECT_ERROR.to_string())
        }
    }
}

/// Content of the post in view on the active LinkedIn tab, if any
async fn current_post_content() -> Option<String> {
    let tab = chrome::active_tab().await.ok()??;
    if !is_savable_tab(&tab.url) {
        return None;
    }
    let data = chrome::request_post(tab.id).await.ok()?.into_post_data()?;
    (!data.content.is_empty()).then_some(data.content)
}

fn empty_list_message(saved: usize) -> &'static str {
    if saved == 0 {
        "No saved posts yet."
    } else {
        "No matching posts found."
    }
}

/// Reload the stored list, drop `post_id`, write it back
async fn delete_post(key: &str, post_id: &str) -> Result<SavedPosts, String> {
    let mut stored = chrome::load_posts(key)
        .await
        .map_err(|e| format!("Failed to read storage: {}", e))?;

    if !stored.remove_post(post_id) {
        log::debug!("Post {} was already gone", post_id);
        return Ok(stored);
    }

    chrome::save_posts(key, &stored)
        .await
        .map_err(|e| format!("Failed to write storage: {}", e))?;

    Ok(stored)
}

/// Reload the stored list, append `record`, write it back
async fn save_post(key: &str, record: SavedPostRecord) -> Result<SavedPosts, String> {
    let mut stored = chrome::load_posts(key)
        .await
        .map_err(|e| format!("Failed to read storage: {}", e))?;

    stored.add_post(record);

    chrome::save_posts(key, &stored)
        .await
        .map_err(|e| format!("Failed to write storage: {}", e))?;

    Ok(stored)
}
