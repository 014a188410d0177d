//! Wallet connection handshake.
//!
//! Detects the host environment once, then drives `connect`:
//! - **Extension**: request accounts → read chain id → switch to the expected
//!   chain if needed (a rejected switch is reported but does not fail the connect)
//! - **Mobile**: hand back a deep link that reopens the page in the wallet app
//! - **Desktop without wallet**: fail with an install notice
//!
//! Only one handshake runs at a time; a second `connect` while one is pending
//! returns [`ConnectOutcome::AlreadyPending`] without touching the provider.

use std::cell::{Cell, RefCell};

use serde::{Deserialize, Serialize};

use crate::config::BoardConfig;
use crate::environment::{detect_environment, Environment, RuntimeContext};
use crate::error::{BoardError, ProviderError};
use crate::identity::Address;
use crate::provider::{chain_name, WalletProvider};

/// What the session knows about the wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionState {
    /// Set only after a successful handshake.
    pub address: Option<Address>,
    pub environment: Environment,
    /// Last chain id observed from the provider.
    pub chain_id: Option<u64>,
}

impl ConnectionState {
    pub fn new(environment: Environment) -> Self {
        Self {
            address: None,
            environment,
            chain_id: None,
        }
    }

    /// A state with an address already set, as if a handshake had succeeded.
    #[cfg(any(test, feature = "dev"))]
    pub fn connected(address: impl Into<Address>, chain_id: u64) -> Self {
        Self {
            address: Some(address.into()),
            environment: Environment::Extension,
            chain_id: Some(chain_id),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.address.is_some()
    }

    /// The connected address, or `NotConnected` for gated actions.
    pub fn require_address(&self) -> Result<&Address, BoardError> {
        self.address.as_ref().ok_or(BoardError::NotConnected)
    }
}

/// Result of a `connect` call that did not fail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectOutcome {
    Connected {
        address: Address,
        chain_id: u64,
        /// Set when the wallet stayed on the wrong chain.
        network_notice: Option<String>,
    },
    /// Mobile browser: navigate here to continue inside the wallet app.
    Redirect { url: String },
    /// Another handshake is still waiting on the wallet.
    AlreadyPending,
}

/// Header data for the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionSummary {
    pub address: Option<String>,
    pub environment: Environment,
    pub chain_id: Option<u64>,
    pub chain_name: Option<String>,
    pub on_expected_chain: bool,
    /// Gated actions (create, browse, bid) are usable.
    pub actions_enabled: bool,
}

/// Clears the in-flight flag when the handshake finishes or its future is dropped.
struct InFlight<'a>(&'a Cell<bool>);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

pub struct ConnectionManager<P> {
    provider: Option<P>,
    expected_chain_id: u64,
    deep_link: String,
    state: RefCell<ConnectionState>,
    in_flight: Cell<bool>,
}

impl<P: WalletProvider> ConnectionManager<P> {
    /// Detect the environment from `ctx` and set up an unconnected session.
    pub fn new(ctx: &RuntimeContext, provider: Option<P>, config: &BoardConfig) -> Self {
        let environment = detect_environment(ctx);
        tracing::debug!(%environment, "Detected wallet environment");
        Self {
            provider,
            expected_chain_id: config.expected_chain_id,
            deep_link: config.mobile_deep_link(),
            state: RefCell::new(ConnectionState::new(environment)),
            in_flight: Cell::new(false),
        }
    }

    pub fn environment(&self) -> Environment {
        self.state.borrow().environment
    }

    pub fn state(&self) -> ConnectionState {
        self.state.borrow().clone()
    }

    pub fn address(&self) -> Option<Address> {
        self.state.borrow().address.clone()
    }

    pub fn is_connected(&self) -> bool {
        self.state.borrow().is_connected()
    }

    pub fn is_pending(&self) -> bool {
        self.in_flight.get()
    }

    pub fn require_address(&self) -> Result<Address, BoardError> {
        self.state.borrow().require_address().cloned()
    }

    pub fn provider(&self) -> Option<&P> {
        self.provider.as_ref()
    }

    pub fn summary(&self) -> ConnectionSummary {
        let state = self.state.borrow();
        ConnectionSummary {
            address: state.address.as_ref().map(Address::truncated),
            environment: state.environment,
            chain_id: state.chain_id,
            chain_name: state.chain_id.map(chain_name),
            on_expected_chain: state.chain_id == Some(self.expected_chain_id),
            actions_enabled: state.is_connected(),
        }
    }

    /// Run the handshake appropriate for the detected environment.
    ///
    /// Provider failures are logged and returned; the connection state is left
    /// exactly as it was before the call.
    pub async fn connect(&self) -> Result<ConnectOutcome, BoardError> {
        let environment = self.environment();
        tracing::info!(%environment, "Attempting to connect wallet");

        match environment {
            Environment::Mobile => {
                let url = self.deep_link.clone();
                tracing::info!(%url, "Redirecting to wallet app");
                return Ok(ConnectOutcome::Redirect { url });
            }
            Environment::DesktopNoWallet => {
                tracing::warn!("No wallet provider installed");
                return Err(ProviderError::WalletMissing.into());
            }
            Environment::Extension => {}
        }

        let Some(provider) = self.provider.as_ref() else {
            tracing::error!("Injected provider reported but not available");
            return Err(ProviderError::WalletMissing.into());
        };

        if self.in_flight.get() {
            tracing::debug!("Connect already in progress, ignoring");
            return Ok(ConnectOutcome::AlreadyPending);
        }
        self.in_flight.set(true);
        let _guard = InFlight(&self.in_flight);

        self.handshake(provider).await.inspect_err(|err| {
            tracing::error!("Error connecting to {}: {err}", provider.provider_name());
        })
    }

    async fn handshake(&self, provider: &P) -> Result<ConnectOutcome, BoardError> {
        let accounts = provider.request_accounts().await?;
        let address = accounts
            .into_iter()
            .next()
            .ok_or(ProviderError::NoAccounts)?;
        let chain_id = provider.chain_id().await?;

        {
            let mut state = self.state.borrow_mut();
            state.address = Some(address.clone());
            state.chain_id = Some(chain_id);
        }
        tracing::info!(%address, chain_id, "Connected successfully");

        if chain_id == self.expected_chain_id {
            return Ok(ConnectOutcome::Connected {
                address,
                chain_id,
                network_notice: None,
            });
        }

        tracing::warn!(
            chain_id,
            expected = self.expected_chain_id,
            "Not on expected chain, attempting to switch"
        );
        let outcome = match self.switch_network(self.expected_chain_id).await {
            Ok(()) => ConnectOutcome::Connected {
                address,
                chain_id: self.expected_chain_id,
                network_notice: None,
            },
            Err(err) => ConnectOutcome::Connected {
                address,
                chain_id,
                network_notice: Some(err.user_notice()),
            },
        };
        Ok(outcome)
    }

    /// Ask the wallet to move to `target`. Never retries; a rejection leaves the
    /// session usable on whatever chain the wallet is on.
    pub async fn switch_network(&self, target: u64) -> Result<(), BoardError> {
        let Some(provider) = self.provider.as_ref() else {
            return Err(ProviderError::WalletMissing.into());
        };

        match provider.switch_chain(target).await {
            Ok(()) => {
                self.state.borrow_mut().chain_id = Some(target);
                tracing::info!(chain_id = target, "Switched to {}", chain_name(target));
                Ok(())
            }
            Err(err) => {
                tracing::warn!("Error switching chain: {err}");
                Err(err.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use futures::join;

    use super::*;
    use crate::provider::mock::MockWalletProvider;

    const ACCOUNT: &str = "0xABCDef0123456789abcdef0123456789ABCD1234";

    fn extension() -> RuntimeContext {
        RuntimeContext::new(true, "Mozilla/5.0 (X11; Linux x86_64)")
    }

    fn manager(
        ctx: RuntimeContext,
        provider: Option<MockWalletProvider>,
    ) -> ConnectionManager<MockWalletProvider> {
        let config = BoardConfig::default().with_dapp_url("https://example.github.io/eqiv");
        ConnectionManager::new(&ctx, provider, &config)
    }

    #[tokio::test]
    async fn extension_connect_on_mainnet() {
        let cm = manager(extension(), Some(MockWalletProvider::new(ACCOUNT, 1)));
        let outcome = cm.connect().await.unwrap();

        assert_eq!(
            outcome,
            ConnectOutcome::Connected {
                address: Address::new(ACCOUNT),
                chain_id: 1,
                network_notice: None,
            }
        );
        assert_eq!(cm.address(), Some(Address::new(ACCOUNT)));
        assert_eq!(cm.provider().unwrap().switch_requests(), 0);
        let summary = cm.summary();
        assert!(summary.actions_enabled);
        assert!(summary.on_expected_chain);
        assert_eq!(summary.address.as_deref(), Some("0xABCD...1234"));
    }

    #[tokio::test]
    async fn first_account_is_used() {
        let wallet = MockWalletProvider::new(ACCOUNT, 1)
            .with_accounts(vec![Address::new("0xfirst"), Address::new("0xsecond")]);
        let cm = manager(extension(), Some(wallet));
        cm.connect().await.unwrap();
        assert_eq!(cm.address(), Some(Address::new("0xfirst")));
    }

    #[tokio::test]
    async fn wrong_chain_triggers_switch() {
        let cm = manager(extension(), Some(MockWalletProvider::new(ACCOUNT, 137)));
        let outcome = cm.connect().await.unwrap();

        assert!(matches!(
            outcome,
            ConnectOutcome::Connected { chain_id: 1, network_notice: None, .. }
        ));
        let wallet = cm.provider().unwrap();
        assert_eq!(wallet.switch_requests(), 1);
        assert_eq!(wallet.current_chain_id(), 1);
        assert_eq!(cm.state().chain_id, Some(1));
    }

    #[tokio::test]
    async fn rejected_switch_still_connects_with_notice() {
        let wallet = MockWalletProvider::new(ACCOUNT, 137).rejecting_switch("User rejected");
        let cm = manager(extension(), Some(wallet));
        let outcome = cm.connect().await.unwrap();

        match outcome {
            ConnectOutcome::Connected {
                chain_id,
                network_notice,
                ..
            } => {
                assert_eq!(chain_id, 137);
                assert_eq!(
                    network_notice.as_deref(),
                    Some("Please switch to Ethereum Mainnet in your wallet.")
                );
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(cm.is_connected());
        assert!(!cm.summary().on_expected_chain);
        // No automatic retry.
        assert_eq!(cm.provider().unwrap().switch_requests(), 1);
    }

    #[tokio::test]
    async fn rejected_accounts_leave_state_unset() {
        let wallet = MockWalletProvider::new(ACCOUNT, 1).rejecting_accounts("User rejected");
        let cm = manager(extension(), Some(wallet));
        let err = cm.connect().await.unwrap_err();

        assert_eq!(
            err,
            BoardError::Provider(ProviderError::Rejected("User rejected".into()))
        );
        assert_eq!(cm.address(), None);
        assert!(!cm.is_pending());
        assert!(!cm.summary().actions_enabled);
    }

    #[tokio::test]
    async fn empty_account_list_is_an_error() {
        let wallet = MockWalletProvider::new(ACCOUNT, 1).with_accounts(Vec::new());
        let cm = manager(extension(), Some(wallet));
        assert_eq!(
            cm.connect().await,
            Err(BoardError::Provider(ProviderError::NoAccounts))
        );
        assert!(!cm.is_connected());
    }

    #[tokio::test]
    async fn chain_id_failure_does_not_store_address() {
        let wallet = MockWalletProvider::new(ACCOUNT, 1)
            .failing_chain_id(ProviderError::Unavailable("disconnected".into()));
        let cm = manager(extension(), Some(wallet));
        assert!(cm.connect().await.is_err());
        assert_eq!(cm.state().address, None);
        assert_eq!(cm.state().chain_id, None);
    }

    #[tokio::test]
    async fn mobile_connect_redirects_without_state_change() {
        let ctx = RuntimeContext::new(false, "Mozilla/5.0 (Linux; Android 14; Pixel 8)");
        let cm = manager(ctx, None);
        assert_eq!(cm.environment(), Environment::Mobile);

        let outcome = cm.connect().await.unwrap();
        assert_eq!(
            outcome,
            ConnectOutcome::Redirect {
                url: "https://metamask.app.link/dapp/example.github.io/eqiv".into()
            }
        );
        assert!(!cm.is_connected());
    }

    #[tokio::test]
    async fn desktop_without_wallet_fails() {
        let ctx = RuntimeContext::new(false, "Mozilla/5.0 (Windows NT 10.0; Win64; x64)");
        let cm = manager(ctx, None);
        assert_eq!(cm.environment(), Environment::DesktopNoWallet);
        assert_eq!(
            cm.connect().await,
            Err(BoardError::Provider(ProviderError::WalletMissing))
        );
        assert!(!cm.is_connected());
    }

    #[tokio::test]
    async fn extension_without_provider_handle_fails() {
        let cm = manager(extension(), None);
        assert_eq!(
            cm.connect().await,
            Err(BoardError::Provider(ProviderError::WalletMissing))
        );
    }

    #[tokio::test]
    async fn second_connect_while_pending_is_ignored() {
        let cm = manager(extension(), Some(MockWalletProvider::new(ACCOUNT, 1)));
        let release = cm.provider().unwrap().hold_accounts();

        let first = cm.connect();
        let second = async {
            // Runs after `first` has parked on the held account request.
            assert!(cm.is_pending());
            let outcome = cm.connect().await;
            release.send(()).unwrap();
            outcome
        };
        let (first, second) = join!(first, second);

        assert_eq!(second, Ok(ConnectOutcome::AlreadyPending));
        assert!(matches!(first, Ok(ConnectOutcome::Connected { .. })));
        assert_eq!(cm.provider().unwrap().account_requests(), 1);
        assert!(!cm.is_pending());
    }

    #[tokio::test]
    async fn dropped_connect_releases_guard() {
        let cm = manager(extension(), Some(MockWalletProvider::new(ACCOUNT, 1)));
        let release = cm.provider().unwrap().hold_accounts();
        {
            let pending = cm.connect();
            futures::pin_mut!(pending);
            assert!(futures::poll!(pending.as_mut()).is_pending());
            assert!(cm.is_pending());
        }
        assert!(!cm.is_pending());
        drop(release);

        assert!(matches!(
            cm.connect().await,
            Ok(ConnectOutcome::Connected { .. })
        ));
    }

    #[tokio::test]
    async fn explicit_switch_network_updates_state() {
        let cm = manager(extension(), Some(MockWalletProvider::new(ACCOUNT, 1)));
        cm.connect().await.unwrap();
        cm.switch_network(11155111).await.unwrap();
        assert_eq!(cm.state().chain_id, Some(11155111));
        assert!(!cm.summary().on_expected_chain);
    }
}
