/// Dashboard page: every saved post, filterable by folder, tag and text

use yew::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{HtmlInputElement, HtmlSelectElement};
use patternfly_yew::prelude::*;
use crate::chrome;
use crate::config::ExtensionConfig;
use crate::filter::{folders, PostFilter};
use crate::storage::SavedPosts;
use crate::ui::components::{ActiveFilter, CardStyle, PostCard, SearchBox};

const ALL_FOLDERS: &str = "";

#[derive(Clone, PartialEq)]
enum ViewState {
    Loading,
    Idle,
    Error(String),
}

#[function_component(Dashboard)]
pub fn dashboard() -> Html {
    let state = use_state(|| ViewState::Loading);
    let config = use_state(ExtensionConfig::default);
    let storage = use_state(SavedPosts::new);
    let search_query = use_state(String::new);
    let tag_filter = use_state(|| None::<String>);
    let folder_filter = use_state(|| None::<String>);
    let dark_mode = use_state(|| false);

    // Load storage on mount
    {
        let state = state.clone();
        let config = config.clone();
        let storage = storage.clone();
        let dark_mode = dark_mode.clone();

        use_effect_with((), move |_| {
            dark_mode.set(chrome::apply_dark_mode());
            spawn_local(async move {
                let loaded = chrome::load_config().await;
                match chrome::load_posts(&loaded.posts_storage_key).await {
                    Ok(data) => {
                        log::info!("Dashboard loaded {} posts", data.len());
                        storage.set(data);
                        state.set(ViewState::Idle);
                    }
                    Err(e) => {
                        state.set(ViewState::Error(format!("Failed to load: {}", e)));
                    }
                }
                config.set(loaded);
            });
            || ()
        });
    }

    let on_search_input = {
        let search_query = search_query.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                search_query.set(input.value());
            }
        })
    };

    let on_folder_change = {
        let folder_filter = folder_filter.clone();
        Callback::from(move |e: Event| {
            if let Some(select) = e.target_dyn_into::<HtmlSelectElement>() {
                let value = select.value();
                folder_filter.set((value != ALL_FOLDERS).then_some(value));
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

    let on_toggle_dark = {
        let dark_mode = dark_mode.clone();
        Callback::from(move |_| {
            let enabled = !*dark_mode;
            chrome::set_dark_mode(enabled);
            dark_mode.set(enabled);
        })
    };

    let ordered = storage.newest_first();
    let folder_options = folders(&ordered, &config.default_folder);
    let filter = PostFilter {
        search: (*search_query).clone(),
        tag: (*tag_filter).clone(),
        folder: (*folder_filter).clone(),
    };
    let visible = filter.apply(&ordered, &config.default_folder);

    html! {
        <div class="dashboard-container">
            <div class="dashboard-header">
                <h1 class="dashboard-title">{"Saved LinkedIn Posts"}</h1>
                <Button onclick={on_toggle_dark} variant={ButtonVariant::Secondary}>
                    {if *dark_mode { "☀️ Light Mode" } else { "🌙 Dark Mode" }}
                </Button>
            </div>

            <div class="dashboard-controls">
                <SearchBox
                    value={(*search_query).clone()}
                    placeholder={"Search posts, authors or tags...".to_string()}
                    oninput={on_search_input}
                />
                <select class="folder-select" onchange={on_folder_change}>
                    <option value={ALL_FOLDERS} selected={folder_filter.is_none()}>{"All Folders"}</option>
                    {for folder_options.iter().map(|folder| html! {
                        <option
                            key={folder.clone()}
                            value={folder.clone()}
                            selected={folder_filter.as_deref() == Some(folder.as_str())}
                        >
                            {folder}
                        </option>
                    })}
                </select>
            </div>

            <ActiveFilter tag={(*tag_filter).clone()} on_clear={on_clear_filter} />

            {match &*state {
                ViewState::Loading => html! {
                    <div class="loading-text-center">
                        <Spinner />
                    </div>
                },
                ViewState::Error(err) => html! {
                    <Alert r#type={AlertType::Danger} title={"Error"} inline={true}>
                        {err.clone()}
                    </Alert>
                },
                ViewState::Idle => {
                    if visible.is_empty() {
                        html! { <p class="empty-text">{"No posts match your filters."}</p> }
                    } else {
                        html! {
                            <div class="posts-grid">
                                {for visible.into_iter().map(|post| html! {
                                    <PostCard
                                        key={post.id.clone()}
                                        post={post.clone()}
                                        style={CardStyle::Dashboard}
                                        default_folder={config.default_folder.clone()}
                                        on_tag_click={on_tag_click.clone()}
                                    />
                                })}
                            </div>
                        }
                    }
                }
            }}
        </div>
    }
}
