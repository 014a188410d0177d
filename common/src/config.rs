use serde::{Deserialize, Serialize};

use crate::currency::DEFAULT_CURRENCY;

/// Ethereum Mainnet.
pub const DEFAULT_CHAIN_ID: u64 = 1;

/// MetaMask universal link; the dapp URL (without scheme) is appended.
pub const DEFAULT_DEEP_LINK_BASE: &str = "https://metamask.app.link/dapp/";

/// Session-wide settings. Constructed once at startup and handed to the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Chain the board expects the wallet to be on.
    pub expected_chain_id: u64,
    /// This page's URL without the scheme, e.g. `example.github.io/eqiv`.
    pub dapp_url: String,
    pub deep_link_base: String,
    pub currency_label: String,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            expected_chain_id: DEFAULT_CHAIN_ID,
            dapp_url: String::new(),
            deep_link_base: DEFAULT_DEEP_LINK_BASE.to_string(),
            currency_label: DEFAULT_CURRENCY.to_string(),
        }
    }
}

impl BoardConfig {
    pub fn with_dapp_url(mut self, url: &str) -> Self {
        self.dapp_url = strip_scheme(url).to_string();
        self
    }

    pub fn with_expected_chain_id(mut self, chain_id: u64) -> Self {
        self.expected_chain_id = chain_id;
        self
    }

    /// Link that reopens this page inside the wallet app's browser.
    pub fn mobile_deep_link(&self) -> String {
        format!(
            "{}{}",
            self.deep_link_base,
            strip_scheme(&self.dapp_url)
        )
    }
}

fn strip_scheme(url: &str) -> &str {
    let url = url.trim();
    url.strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url)
}
