use dioxus::prelude::*;

use eqiv_common::media::MediaKind;
use eqiv_common::request::{RequestDetail, RequestId};
use eqiv_common::BoardError;

use super::session_state::{use_connection, use_session_state};

/// One request with its media, its bids, and a form to add a bid.
#[component]
pub fn RequestDetailView(id: RequestId) -> Element {
    let mut session = use_session_state();
    let connection = use_connection();
    let mut amount = use_signal(String::new);
    let mut message = use_signal(String::new);

    let detail: Result<RequestDetail, BoardError> = connection.require_address().and_then(|_| {
        let state = session.read();
        state
            .ledger
            .get_request(id)
            .map(|r| RequestDetail::from_request(r, &state.config.currency_label))
            .ok_or(BoardError::RequestNotFound(id))
    });
    let detail = match detail {
        Ok(detail) => detail,
        Err(e) => {
            let notice = e.user_notice();
            return rsx! {
                p { class: "empty-state", "{notice}" }
            };
        }
    };
    let currency = session.read().config.currency_label.clone();
    let bid_count = detail.bids.len();
    let bids: Vec<_> = detail
        .bids
        .iter()
        .map(|bid| (bid.clone(), bid.submitted_at.format("%Y-%m-%d %H:%M").to_string()))
        .collect();

    rsx! {
        div { class: "request-detail",
            h2 { "{detail.title}" }
            p { class: "request-meta", "{detail.category} · {detail.location}" }
            p { class: "request-budget", "Budget: {detail.budget}" }
            p { class: "request-owner", "Posted by {detail.requester}" }
            p { class: "request-description", "{detail.description}" }

            if !detail.media.is_empty() {
                div { class: "media-gallery",
                    for item in detail.media.iter() {
                        if item.kind == MediaKind::Image {
                            img { src: "{item.locator}" }
                        } else {
                            video { src: "{item.locator}", controls: true }
                        }
                    }
                }
            }

            h3 { "Bids ({bid_count})" }
            if detail.bids.is_empty() {
                p { class: "empty-state", "No bids yet." }
            }
            ul { class: "bid-list",
                for (bid, when) in bids {
                    li {
                        span { class: "bid-amount", "{bid.amount}" }
                        span { class: "bid-from", " from {bid.bidder}" }
                        span { class: "bid-time", " at {when}" }
                        if let Some(text) = bid.message {
                            p { class: "bid-message", "{text}" }
                        }
                    }
                }
            }

            div { class: "bid-form",
                h3 { "Place a bid" }
                div { class: "form-group",
                    label { "Amount ({currency}):" }
                    input {
                        r#type: "number",
                        min: "0",
                        step: "any",
                        value: "{amount}",
                        oninput: move |evt| amount.set(evt.value()),
                    }
                }
                div { class: "form-group",
                    label { "Message (optional):" }
                    textarea {
                        value: "{message}",
                        oninput: move |evt| message.set(evt.value()),
                    }
                }
                button {
                    onclick: move |_| {
                        let session_state = connection.state();
                        let text = message.read().clone();
                        let mut state = session.write();
                        let result = state
                            .ledger
                            .place_bid_input(&session_state, id, &amount.read(), Some(text.as_str()))
                            .map(|_| ());
                        match result {
                            Ok(()) => {
                                state.notice = None;
                                amount.set(String::new());
                                message.set(String::new());
                            }
                            Err(e) => {
                                tracing::warn!("Bid not placed: {e}");
                                state.set_notice(e.user_notice());
                            }
                        }
                    },
                    "Submit Bid"
                }
            }
        }
    }
}
