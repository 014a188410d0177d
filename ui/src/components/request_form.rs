use dioxus::prelude::*;

use eqiv_common::category::ServiceCategory;
use eqiv_common::media::MediaItem;
use eqiv_common::request::{RequestDraft, RequestId};

use super::app::Route;
use super::session_state::{use_connection, use_session_state};

const MEDIA_INPUT_ID: &str = "request-media";

#[component]
pub fn RequestForm() -> Element {
    let mut session = use_session_state();
    let connection = use_connection();
    let nav = use_navigator();

    let mut draft = use_signal(RequestDraft::default);
    let mut media = use_signal(Vec::<MediaItem>::new);
    let mut created = use_signal(|| None::<RequestId>);

    if let Some(id) = *created.read() {
        return rsx! {
            div { class: "request-confirmation",
                h3 { "Request posted!" }
                p { "Request #{id} is now open for bids." }
                button {
                    onclick: move |_| { nav.push(Route::Request { id: id.0 }); },
                    "View request"
                }
                button {
                    onclick: move |_| {
                        draft.set(RequestDraft::default());
                        media.set(Vec::new());
                        created.set(None);
                    },
                    "Post another"
                }
            }
        };
    }

    let currency = session.read().config.currency_label.clone();
    let attached = media.read().len();

    rsx! {
        div { class: "request-form",
            h2 { "Post a Service Request" }
            div { class: "form-group",
                label { "Category:" }
                select {
                    value: "{draft.read().category}",
                    onchange: move |evt| draft.write().category = evt.value(),
                    option { value: "", "Select a category" }
                    for category in ServiceCategory::all() {
                        option { value: "{category.slug()}", "{category.label()}" }
                    }
                }
            }
            div { class: "form-group",
                label { "Title:" }
                input {
                    value: "{draft.read().title}",
                    oninput: move |evt| draft.write().title = evt.value(),
                }
            }
            div { class: "form-group",
                label { "Description:" }
                textarea {
                    value: "{draft.read().description}",
                    oninput: move |evt| draft.write().description = evt.value(),
                }
            }
            div { class: "form-group",
                label { "Budget ({currency}):" }
                input {
                    r#type: "number",
                    min: "0",
                    step: "any",
                    value: "{draft.read().budget}",
                    oninput: move |evt| draft.write().budget = evt.value(),
                }
            }
            div { class: "form-group",
                label { "Location:" }
                input {
                    value: "{draft.read().location}",
                    oninput: move |evt| draft.write().location = evt.value(),
                }
            }
            div { class: "form-group",
                label { "Photos or videos:" }
                input {
                    id: MEDIA_INPUT_ID,
                    r#type: "file",
                    multiple: true,
                    accept: "image/*,video/*",
                    onchange: move |_| apply_selection(&mut media.write(), selected_media()),
                }
                if attached > 0 {
                    span { class: "media-count", "{attached} file(s) attached" }
                }
            }
            button {
                onclick: move |_| {
                    let session_state = connection.state();
                    let mut state = session.write();
                    let result = state
                        .ledger
                        .create_request(&session_state, &draft.read(), media.read().clone())
                        .map(|request| request.id);
                    match result {
                        Ok(id) => {
                            state.notice = None;
                            created.set(Some(id));
                        }
                        Err(e) => {
                            tracing::warn!("Request not created: {e}");
                            state.set_notice(e.user_notice());
                        }
                    }
                },
                "Submit Request"
            }
        }
    }
}

/// An empty pick (dialog cancelled) keeps the current attachments.
fn apply_selection(current: &mut Vec<MediaItem>, picked: Vec<MediaItem>) {
    if !picked.is_empty() {
        *current = picked;
    }
}

/// Files picked in the media input, each exposed through an object URL.
fn selected_media() -> Vec<MediaItem> {
    #[cfg(target_family = "wasm")]
    {
        use wasm_bindgen::JsCast;

        let Some(input) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(MEDIA_INPUT_ID))
            .and_then(|el| el.dyn_into::<web_sys::HtmlInputElement>().ok())
        else {
            return Vec::new();
        };
        let Some(files) = input.files() else {
            return Vec::new();
        };

        (0..files.length())
            .filter_map(|i| files.get(i))
            .filter_map(|file| match web_sys::Url::create_object_url_with_blob(&file) {
                Ok(url) => Some(MediaItem::from_mime(&file.type_(), url)),
                Err(e) => {
                    tracing::error!("Failed to read {}: {e:?}", file.name());
                    None
                }
            })
            .collect()
    }
    #[cfg(not(target_family = "wasm"))]
    {
        Vec::new()
    }
}
