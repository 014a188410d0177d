use std::rc::Rc;

use dioxus::prelude::*;

use eqiv_common::connection::ConnectionManager;
use eqiv_common::request::RequestId;

use super::injected_provider::InjectedProvider;
use super::request_detail::RequestDetailView;
use super::request_form::RequestForm;
use super::request_list::RequestList;
use super::session_state::{board_config, runtime_context, use_session_state, Connection, SessionState};
use super::wallet_panel::WalletPanel;

#[derive(Clone, Debug, PartialEq, Routable)]
pub enum Route {
    #[layout(AppLayout)]
    #[route("/")]
    Home {},
    #[route("/create")]
    Create {},
    #[route("/browse")]
    Browse {},
    #[route("/request/:id")]
    Request { id: u64 },
}

#[component]
pub fn App() -> Element {
    let connection: Connection = use_hook(|| {
        let provider = InjectedProvider::detect();
        let ctx = runtime_context(provider.as_ref());
        Rc::new(ConnectionManager::new(&ctx, provider, &board_config()))
    });
    let summary = connection.summary();
    use_context_provider(|| connection);
    use_context_provider(|| Signal::new(SessionState::new(board_config(), summary)));

    rsx! { Router::<Route> {} }
}

#[component]
fn AppLayout() -> Element {
    let mut session = use_session_state();
    let nav = use_navigator();

    let state = session.read();
    let enabled = state.summary.actions_enabled;
    let notice = state.notice.clone();
    let count = state.ledger.len();
    drop(state);

    rsx! {
        div { class: "eqiv-app",
            header { class: "app-header",
                div { class: "header-top",
                    h1 { "EQIV" }
                    WalletPanel {}
                }
                p { "Decentralized service requests" }
                nav {
                    button {
                        onclick: move |_| { nav.push(Route::Home {}); },
                        "Home"
                    }
                    button {
                        disabled: !enabled,
                        onclick: move |_| { nav.push(Route::Create {}); },
                        "Post a Request"
                    }
                    button {
                        disabled: !enabled,
                        onclick: move |_| { nav.push(Route::Browse {}); },
                        "Browse Requests ({count})"
                    }
                }
            }
            if let Some(text) = notice {
                div { class: "notice",
                    span { "{text}" }
                    button {
                        onclick: move |_| session.write().notice = None,
                        "Dismiss"
                    }
                }
            }
            main {
                Outlet::<Route> {}
            }
        }
    }
}

/// Route component: landing page.
#[component]
fn Home() -> Element {
    let session = use_session_state();
    let connected = session.read().summary.address.is_some();

    rsx! {
        section { class: "home",
            h2 { "Get local services, paid in crypto" }
            if connected {
                p { "Post what you need done, or browse open requests and bid on them." }
            } else {
                p { "Connect your wallet to post requests and place bids." }
            }
        }
    }
}

/// Route component: the new-request form.
#[component]
fn Create() -> Element {
    rsx! { RequestForm {} }
}

/// Route component: filtered request listing.
#[component]
fn Browse() -> Element {
    rsx! { RequestList {} }
}

/// Route component: one request and its bids.
#[component]
fn Request(id: u64) -> Element {
    rsx! { RequestDetailView { id: RequestId(id) } }
}
