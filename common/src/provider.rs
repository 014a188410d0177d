use crate::error::ProviderError;
use crate::identity::Address;

/// Abstraction over an in-page wallet (EIP-1193 style injected provider, mock, etc.).
///
/// Calls may suspend for as long as the user takes to answer the wallet prompt.
/// Methods take `&self`: the page is single-threaded and the provider is shared
/// by whoever holds the connection manager.
#[allow(async_fn_in_trait)]
pub trait WalletProvider {
    /// Ask the user to expose their accounts (`eth_requestAccounts`).
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError>;

    /// Currently active chain (`eth_chainId`).
    async fn chain_id(&self) -> Result<u64, ProviderError>;

    /// Ask the wallet to switch chains (`wallet_switchEthereumChain`).
    async fn switch_chain(&self, chain_id: u64) -> Result<(), ProviderError>;

    /// Human-readable provider name (e.g. "metamask", "mock").
    fn provider_name(&self) -> &str;
}

/// Display name for well-known chains.
pub fn chain_name(chain_id: u64) -> String {
    match chain_id {
        1 => "Ethereum Mainnet".to_string(),
        10 => "OP Mainnet".to_string(),
        56 => "BNB Smart Chain".to_string(),
        137 => "Polygon".to_string(),
        8453 => "Base".to_string(),
        42161 => "Arbitrum One".to_string(),
        11155111 => "Sepolia".to_string(),
        other => format!("chain {other}"),
    }
}

/// EIP-1193 encodes chain ids as `0x`-prefixed hex.
pub fn chain_id_to_hex(chain_id: u64) -> String {
    format!("0x{chain_id:x}")
}

/// Parse a chain id as reported by a wallet: `0x`-prefixed hex or plain decimal.
pub fn parse_chain_id(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    match raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => raw.parse().ok(),
    }
}

#[cfg(any(test, feature = "dev"))]
pub mod mock {
    use std::cell::{Cell, RefCell};

    use futures::channel::oneshot;

    use super::WalletProvider;
    use crate::error::ProviderError;
    use crate::identity::Address;

    /// Scripted wallet for tests and the simulator.
    ///
    /// Answers immediately unless `hold_accounts` was called, in which case the
    /// next account request stays pending until the returned sender fires.
    pub struct MockWalletProvider {
        accounts: RefCell<Result<Vec<Address>, ProviderError>>,
        chain_id: Cell<u64>,
        chain_id_error: RefCell<Option<ProviderError>>,
        switch_rejection: RefCell<Option<String>>,
        account_gate: RefCell<Option<oneshot::Receiver<()>>>,
        account_requests: Cell<u32>,
        switch_requests: Cell<u32>,
    }

    impl MockWalletProvider {
        pub fn new(account: impl Into<Address>, chain_id: u64) -> Self {
            Self {
                accounts: RefCell::new(Ok(vec![account.into()])),
                chain_id: Cell::new(chain_id),
                chain_id_error: RefCell::new(None),
                switch_rejection: RefCell::new(None),
                account_gate: RefCell::new(None),
                account_requests: Cell::new(0),
                switch_requests: Cell::new(0),
            }
        }

        /// The user dismisses the connection prompt.
        pub fn rejecting_accounts(self, reason: &str) -> Self {
            *self.accounts.borrow_mut() = Err(ProviderError::Rejected(reason.to_string()));
            self
        }

        pub fn with_accounts(self, accounts: Vec<Address>) -> Self {
            *self.accounts.borrow_mut() = Ok(accounts);
            self
        }

        /// The user declines every network switch prompt.
        pub fn rejecting_switch(self, reason: &str) -> Self {
            *self.switch_rejection.borrow_mut() = Some(reason.to_string());
            self
        }

        pub fn failing_chain_id(self, error: ProviderError) -> Self {
            *self.chain_id_error.borrow_mut() = Some(error);
            self
        }

        /// Keep the next `request_accounts` pending until the sender fires (or drops).
        pub fn hold_accounts(&self) -> oneshot::Sender<()> {
            let (tx, rx) = oneshot::channel();
            *self.account_gate.borrow_mut() = Some(rx);
            tx
        }

        pub fn account_requests(&self) -> u32 {
            self.account_requests.get()
        }

        pub fn switch_requests(&self) -> u32 {
            self.switch_requests.get()
        }

        pub fn current_chain_id(&self) -> u64 {
            self.chain_id.get()
        }
    }

    impl WalletProvider for MockWalletProvider {
        async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError> {
            self.account_requests.set(self.account_requests.get() + 1);
            let gate = self.account_gate.borrow_mut().take();
            if let Some(gate) = gate {
                // A dropped sender releases the request just like a fired one.
                let _ = gate.await;
            }
            self.accounts.borrow().clone()
        }

        async fn chain_id(&self) -> Result<u64, ProviderError> {
            match self.chain_id_error.borrow().clone() {
                Some(err) => Err(err),
                None => Ok(self.chain_id.get()),
            }
        }

        async fn switch_chain(&self, chain_id: u64) -> Result<(), ProviderError> {
            self.switch_requests.set(self.switch_requests.get() + 1);
            if let Some(reason) = self.switch_rejection.borrow().clone() {
                return Err(ProviderError::SwitchRejected { chain_id, reason });
            }
            self.chain_id.set(chain_id);
            Ok(())
        }

        fn provider_name(&self) -> &str {
            "mock"
        }
    }
}
