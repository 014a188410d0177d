use dioxus::prelude::*;

use eqiv_common::connection::ConnectOutcome;
use eqiv_common::environment::Environment;

use super::session_state::{use_connection, use_session_state};

/// Connect button and connection status for the header.
#[component]
pub fn WalletPanel() -> Element {
    let mut session = use_session_state();
    let connection = use_connection();
    let mut connecting = use_signal(|| false);

    let summary = session.read().summary.clone();

    if let Some(address) = summary.address {
        let chain = summary.chain_name.unwrap_or_default();
        return rsx! {
            div { class: "wallet-panel connected",
                span { class: "wallet-address", "{address}" }
                span {
                    class: if summary.on_expected_chain { "wallet-chain" } else { "wallet-chain wrong" },
                    "{chain}"
                }
            }
        };
    }

    let label = match summary.environment {
        Environment::Extension => "Connect Wallet",
        Environment::Mobile => "Open in Wallet App",
        Environment::DesktopNoWallet => "Install a Wallet",
    };

    rsx! {
        div { class: "wallet-panel",
            button {
                disabled: *connecting.read(),
                onclick: move |_| {
                    let connection = connection.clone();
                    spawn(async move {
                        connecting.set(true);
                        let result = connection.connect().await;
                        connecting.set(false);

                        let mut state = session.write();
                        state.summary = connection.summary();
                        match result {
                            Ok(ConnectOutcome::Connected { network_notice, .. }) => {
                                state.notice = network_notice;
                            }
                            Ok(ConnectOutcome::Redirect { url }) => {
                                drop(state);
                                open_in_wallet(&url);
                            }
                            Ok(ConnectOutcome::AlreadyPending) => {}
                            Err(e) => {
                                tracing::warn!("Wallet connect failed: {e}");
                                state.set_notice(e.user_notice());
                            }
                        }
                    });
                },
                if *connecting.read() { "Connecting..." } else { "{label}" }
            }
        }
    }
}

fn open_in_wallet(url: &str) {
    #[cfg(target_family = "wasm")]
    {
        if let Some(window) = web_sys::window() {
            if let Err(e) = window.location().set_href(url) {
                tracing::error!("Failed to open wallet link: {e:?}");
            }
        }
    }
    #[cfg(not(target_family = "wasm"))]
    {
        tracing::info!(url, "Open in wallet app");
    }
}
