/// Reusable UI components

use patternfly_yew::prelude::{Button, ButtonSize, ButtonVariant};
use yew::prelude::*;

use crate::filter::{folder_of, preview};
use crate::post_data::SavedPostRecord;

/// Which page a card is drawn on; the two pages word things differently
#[derive(PartialEq, Clone, Copy)]
pub enum CardStyle {
    Popup,
    Dashboard,
}

impl CardStyle {
    fn author_fallback(&self) -> &'static str {
        match self {
            CardStyle::Popup => "LinkedIn User",
            CardStyle::Dashboard => "Anonymous",
        }
    }

    fn preview_chars(&self) -> usize {
        match self {
            CardStyle::Popup => 100,
            CardStyle::Dashboard => 120,
        }
    }

    fn class(&self) -> &'static str {
        match self {
            CardStyle::Popup => "post",
            CardStyle::Dashboard => "post-card",
        }
    }
}

#[derive(Properties, PartialEq)]
pub struct TagListProps {
    pub tags: Vec<String>,
    pub on_click: Callback<String>,
    #[prop_or_default]
    pub class: Option<String>,
}

#[function_component(TagList)]
pub fn tag_list(props: &TagListProps) -> Html {
    if props.tags.is_empty() {
        return html! {};
    }

    let class = props.class.clone().unwrap_or_else(|| "tag clickable-tag".to_string());

    html! {
        <div class="tag-list">
            {for props.tags.iter().map(|tag| {
                let onclick = props.on_click.reform({
                    let tag = tag.clone();
                    move |_: MouseEvent| tag.clone()
                });
                html! {
                    <span key={tag.clone()} class={class.clone()} {onclick}>{tag}</span>
                }
            })}
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct PostCardProps {
    pub post: SavedPostRecord,
    pub style: CardStyle,
    pub default_folder: String,
    pub on_tag_click: Callback<String>,
    #[prop_or_default]
    pub on_delete: Option<Callback<String>>,
}

#[function_component(PostCard)]
pub fn post_card(props: &PostCardProps) -> Html {
    let post = &props.post;
    let style = props.style;

    let author = if post.author.is_empty() {
        style.author_fallback().to_string()
    } else {
        post.author.clone()
    };

    let body = if post.content.is_empty() && style == CardStyle::Dashboard {
        "No content available.".to_string()
    } else {
        preview(&post.content, style.preview_chars())
    };

    html! {
        <div class={style.class()}>
            <div class="post-header">
                <div class="post-author">{author}</div>
                if let Some(on_delete) = &props.on_delete {
                    <Button
                        onclick={on_delete.reform({
                            let id = post.id.clone();
                            move |_| id.clone()
                        })}
                        variant={ButtonVariant::Plain}
                        size={ButtonSize::Small}
                    >
                        {"×"}
                    </Button>
                }
            </div>

            <p class="post-content">{body}</p>
            <p class="post-folder">{"📁 "}<b>{folder_of(post, &props.default_folder)}</b></p>

            <TagList tags={post.tags.clone()} on_click={props.on_tag_click.clone()} />

            <a href={post.url.clone()} target="_blank" class="post-link">{"🔗 View on LinkedIn"}</a>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct ActiveFilterProps {
    pub tag: Option<String>,
    pub on_clear: Callback<()>,
}

/// Banner naming the tag currently filtered on
#[function_component(ActiveFilter)]
pub fn active_filter(props: &ActiveFilterProps) -> Html {
    match &props.tag {
        Some(tag) => html! {
            <div class="active-filter">
                {"Filtering by tag: "}<b>{tag}</b>
                <Button
                    onclick={props.on_clear.reform(|_| ())}
                    variant={ButtonVariant::Link}
                    size={ButtonSize::Small}
                >
                    {"Clear"}
                </Button>
            </div>
        },
        None => html! {},
    }
}

#[derive(Properties, PartialEq)]
pub struct SearchBoxProps {
    pub value: String,
    pub placeholder: String,
    pub oninput: Callback<InputEvent>,
}

#[function_component(SearchBox)]
pub fn search_box(props: &SearchBoxProps) -> Html {
    html! {
        <div class="search-container">
            <input
                type="text"
                placeholder={props.placeholder.clone()}
                value={props.value.clone()}
                oninput={props.oninput.clone()}
                class="search-input"
            />
        </div>
    }
}
