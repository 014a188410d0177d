use dioxus::prelude::*;

use eqiv_common::category::{CategoryFilter, ServiceCategory};
use eqiv_common::currency::format_amount;
use eqiv_common::media::MediaKind;

use super::app::Route;
use super::session_state::{use_connection, use_session_state};

/// One row of the listing, copied out of the ledger for rendering.
#[derive(Clone, PartialEq)]
struct ListingRow {
    id: u64,
    title: String,
    category: String,
    budget: String,
    location: String,
    bids: usize,
    thumbnail: Option<String>,
}

#[component]
pub fn RequestList() -> Element {
    let session = use_session_state();
    let connection = use_connection();
    let mut filter = use_signal(CategoryFilter::default);

    if let Err(e) = connection.require_address() {
        let notice = e.user_notice();
        return rsx! {
            p { class: "empty-state", "{notice}" }
        };
    }

    let state = session.read();
    let active = *filter.read();
    let rows: Vec<ListingRow> = state
        .ledger
        .list_requests(&active)
        .map(|r| ListingRow {
            id: r.id.0,
            title: r.title.clone(),
            category: r.category.label(),
            budget: format_amount(r.budget, &state.config.currency_label),
            location: r.location.clone(),
            bids: r.bid_count(),
            thumbnail: r
                .media
                .iter()
                .find(|m| m.kind == MediaKind::Image)
                .map(|m| m.locator.clone()),
        })
        .collect();
    drop(state);

    rsx! {
        div { class: "request-list",
            h2 { "Open Requests" }
            div { class: "form-group",
                label { "Category:" }
                select {
                    onchange: move |evt| {
                        match evt.value().parse::<CategoryFilter>() {
                            Ok(f) => filter.set(f),
                            Err(e) => tracing::warn!("Ignoring filter: {e}"),
                        }
                    },
                    option { value: "all", "All categories" }
                    for category in ServiceCategory::all() {
                        option { value: "{category.slug()}", "{category.label()}" }
                    }
                }
            }
            if rows.is_empty() {
                p { class: "empty-state", "No requests yet." }
            }
            for row in rows {
                ListingCard { key: "{row.id}", row }
            }
        }
    }
}

#[component]
fn ListingCard(row: ListingRow) -> Element {
    let nav = use_navigator();
    let id = row.id;

    rsx! {
        div {
            class: "request-card",
            onclick: move |_| { nav.push(Route::Request { id }); },
            if let Some(src) = row.thumbnail {
                img { class: "thumbnail", src: "{src}" }
            }
            h3 { "{row.title}" }
            p { class: "request-meta", "{row.category} · {row.location}" }
            p { class: "request-budget", "Budget: {row.budget}" }
            p { class: "request-bids", "{row.bids} bid(s)" }
        }
    }
}
