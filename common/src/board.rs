use crate::category::CategoryFilter;
use crate::config::BoardConfig;
use crate::connection::{ConnectOutcome, ConnectionManager, ConnectionSummary};
use crate::environment::RuntimeContext;
use crate::error::BoardError;
use crate::ledger::RequestLedger;
use crate::media::MediaItem;
use crate::provider::WalletProvider;
use crate::request::{Bid, RequestDetail, RequestDraft, RequestId, ServiceRequest};

/// One browsing session: the wallet connection plus the request ledger.
///
/// Ledger operations read the connection state at call time, so nothing is
/// reachable until `connect` has stored an address.
pub struct Board<P> {
    config: BoardConfig,
    connection: ConnectionManager<P>,
    ledger: RequestLedger,
}

impl<P: WalletProvider> Board<P> {
    pub fn new(config: BoardConfig, ctx: &RuntimeContext, provider: Option<P>) -> Self {
        let connection = ConnectionManager::new(ctx, provider, &config);
        Self {
            config,
            connection,
            ledger: RequestLedger::new(),
        }
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn connection(&self) -> &ConnectionManager<P> {
        &self.connection
    }

    pub fn ledger(&self) -> &RequestLedger {
        &self.ledger
    }

    pub async fn connect(&self) -> Result<ConnectOutcome, BoardError> {
        self.connection.connect().await
    }

    pub fn summary(&self) -> ConnectionSummary {
        self.connection.summary()
    }

    pub fn create_request(
        &mut self,
        draft: &RequestDraft,
        media: Vec<MediaItem>,
    ) -> Result<&ServiceRequest, BoardError> {
        let session = self.connection.state();
        self.ledger.create_request(&session, draft, media)
    }

    /// Browsing is gated like every other ledger action.
    pub fn list_requests<'a>(
        &'a self,
        filter: &'a CategoryFilter,
    ) -> Result<impl Iterator<Item = &'a ServiceRequest> + 'a, BoardError> {
        self.connection.require_address()?;
        Ok(self.ledger.list_requests(filter))
    }

    pub fn request_detail(&self, id: RequestId) -> Result<RequestDetail, BoardError> {
        self.connection.require_address()?;
        self.ledger
            .get_request(id)
            .map(|r| RequestDetail::from_request(r, &self.config.currency_label))
            .ok_or(BoardError::RequestNotFound(id))
    }

    pub fn place_bid(
        &mut self,
        id: RequestId,
        amount: f64,
        message: Option<&str>,
    ) -> Result<&Bid, BoardError> {
        let session = self.connection.state();
        self.ledger.place_bid(&session, id, amount, message)
    }

    pub fn place_bid_input(
        &mut self,
        id: RequestId,
        raw_amount: &str,
        message: Option<&str>,
    ) -> Result<&Bid, BoardError> {
        let session = self.connection.state();
        self.ledger.place_bid_input(&session, id, raw_amount, message)
    }
}
