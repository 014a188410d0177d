use std::rc::Rc;

use dioxus::prelude::*;

use eqiv_common::config::BoardConfig;
use eqiv_common::connection::{ConnectionManager, ConnectionSummary};
use eqiv_common::environment::RuntimeContext;
use eqiv_common::ledger::RequestLedger;

use super::injected_provider::InjectedProvider;

/// Wallet connection shared by every component. Lives for the whole page.
pub type Connection = Rc<ConnectionManager<InjectedProvider>>;

/// Reactive session state. Components re-render when any of it changes.
#[derive(Clone, Debug)]
pub struct SessionState {
    pub config: BoardConfig,
    pub ledger: RequestLedger,
    /// Refreshed after every handshake or network switch.
    pub summary: ConnectionSummary,
    /// Last user-facing notice (validation failure, wallet error, ...).
    pub notice: Option<String>,
}

impl SessionState {
    pub fn new(config: BoardConfig, summary: ConnectionSummary) -> Self {
        Self {
            config,
            ledger: RequestLedger::new(),
            summary,
            notice: None,
        }
    }

    pub fn set_notice(&mut self, notice: impl Into<String>) {
        self.notice = Some(notice.into());
    }
}

/// Board settings baked in at build time, falling back to the page's own location.
pub fn board_config() -> BoardConfig {
    let mut config = BoardConfig::default();
    if let Some(chain) = option_env!("EQIV_CHAIN_ID").and_then(eqiv_common::provider::parse_chain_id) {
        config = config.with_expected_chain_id(chain);
    }
    match option_env!("EQIV_DAPP_URL") {
        Some(url) => config.with_dapp_url(url),
        None => config.with_dapp_url(&page_url()),
    }
}

/// What the page can see about its host: an injected wallet and the user agent.
pub fn runtime_context(provider: Option<&InjectedProvider>) -> RuntimeContext {
    RuntimeContext::new(provider.is_some(), user_agent())
}

fn page_url() -> String {
    #[cfg(target_family = "wasm")]
    {
        web_sys::window()
            .and_then(|w| w.location().href().ok())
            .unwrap_or_default()
    }
    #[cfg(not(target_family = "wasm"))]
    {
        String::new()
    }
}

fn user_agent() -> String {
    #[cfg(target_family = "wasm")]
    {
        web_sys::window()
            .and_then(|w| w.navigator().user_agent().ok())
            .unwrap_or_default()
    }
    #[cfg(not(target_family = "wasm"))]
    {
        String::new()
    }
}

pub fn use_session_state() -> Signal<SessionState> {
    use_context::<Signal<SessionState>>()
}

pub fn use_connection() -> Connection {
    use_context::<Connection>()
}
