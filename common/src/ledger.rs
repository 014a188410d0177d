use chrono::{DateTime, Utc};
use crate::category::CategoryFilter;
use crate::connection::ConnectionState;
use crate::error::{BoardError, ValidationError};
use crate::media::MediaItem;
use crate::request::{
    normalize_message, validate_bid_amount, Bid, RequestDraft, RequestId, ServiceRequest,
};

/// All service requests posted during this session, in creation order.
///
/// Grows only: requests are appended by `create_request` and mutated only by
/// appending bids. Nothing is ever removed.
#[derive(Debug, Clone, Default)]
pub struct RequestLedger {
    requests: Vec<ServiceRequest>,
    last_id: u64,
}

impl RequestLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ServiceRequest> {
        self.requests.iter()
    }

    pub fn get_request(&self, id: RequestId) -> Option<&ServiceRequest> {
        self.requests.iter().find(|r| r.id == id)
    }

    /// Requests matching `filter`, in ledger order.
    pub fn list_requests<'a>(
        &'a self,
        filter: &'a CategoryFilter,
    ) -> impl Iterator<Item = &'a ServiceRequest> + 'a {
        self.requests
            .iter()
            .filter(move |r| filter.matches(r.category))
    }

    pub fn create_request(
        &mut self,
        session: &ConnectionState,
        draft: &RequestDraft,
        media: Vec<MediaItem>,
    ) -> Result<&ServiceRequest, BoardError> {
        self.create_request_at(session, draft, media, Utc::now())
    }

    /// Validate `draft` and append a new request stamped with the session address.
    pub fn create_request_at(
        &mut self,
        session: &ConnectionState,
        draft: &RequestDraft,
        media: Vec<MediaItem>,
        now: DateTime<Utc>,
    ) -> Result<&ServiceRequest, BoardError> {
        let requester = session.require_address()?.clone();
        let valid = draft.validate()?;

        let id = self.next_id(now);
        self.requests.push(ServiceRequest {
            id,
            requester,
            category: valid.category,
            title: valid.title,
            description: valid.description,
            location: valid.location,
            budget: valid.budget,
            media,
            bids: Vec::new(),
            created_at: now,
        });
        tracing::info!(%id, "New service request created");

        let created = &self.requests[self.requests.len() - 1];
        Ok(created)
    }

    /// Place a bid from raw form input (amount as typed).
    pub fn place_bid_input(
        &mut self,
        session: &ConnectionState,
        id: RequestId,
        raw_amount: &str,
        message: Option<&str>,
    ) -> Result<&Bid, BoardError> {
        session.require_address()?;
        let amount = validate_bid_amount(raw_amount)?;
        self.place_bid(session, id, amount, message)
    }

    pub fn place_bid(
        &mut self,
        session: &ConnectionState,
        id: RequestId,
        amount: f64,
        message: Option<&str>,
    ) -> Result<&Bid, BoardError> {
        self.place_bid_at(session, id, amount, message, Utc::now())
    }

    /// Append a bid to request `id`. The same bidder may bid any number of times.
    pub fn place_bid_at(
        &mut self,
        session: &ConnectionState,
        id: RequestId,
        amount: f64,
        message: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<&Bid, BoardError> {
        let bidder = session.require_address()?.clone();
        if !amount.is_finite() || amount <= 0.0 {
            return Err(ValidationError::InvalidBidAmount(amount.to_string()).into());
        }

        let request = self
            .requests
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(BoardError::RequestNotFound(id))?;

        request.bids.push(Bid {
            bidder,
            amount,
            message: normalize_message(message),
            submitted_at: now,
        });
        tracing::info!(%id, amount, bids = request.bids.len(), "Bid submitted");

        let placed = &request.bids[request.bids.len() - 1];
        Ok(placed)
    }

    /// Serialize the whole ledger as pretty-printed JSON.
    pub fn export_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.requests)
    }

    /// Millisecond timestamp, bumped past the previous id on collision.
    fn next_id(&mut self, now: DateTime<Utc>) -> RequestId {
        let millis = u64::try_from(now.timestamp_millis()).unwrap_or(0);
        let id = millis.max(self.last_id.saturating_add(1));
        self.last_id = id;
        RequestId(id)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::category::ServiceCategory;
    use crate::identity::Address;
    use crate::media::MediaKind;

    fn session() -> ConnectionState {
        ConnectionState::connected("0xABCDef0123456789abcdef0123456789ABCD1234", 1)
    }

    fn draft(category: &str, title: &str) -> RequestDraft {
        RequestDraft {
            category: category.into(),
            title: title.into(),
            description: "details".into(),
            budget: "100".into(),
            location: "NYC".into(),
        }
    }

    fn at(millis: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(millis).unwrap()
    }

    #[test]
    fn create_appends_and_stamps_requester() {
        let mut ledger = RequestLedger::new();
        let media = vec![MediaItem::new(MediaKind::Image, "blob:1")];
        let created = ledger
            .create_request(&session(), &draft("cleaning", "Deep clean"), media.clone())
            .unwrap()
            .clone();

        assert_eq!(ledger.len(), 1);
        assert_eq!(created.requester, Address::new("0xABCDef0123456789abcdef0123456789ABCD1234"));
        assert_eq!(created.media, media);
        assert!(created.bids.is_empty());
        assert_eq!(ledger.get_request(created.id), Some(&created));
    }

    #[test]
    fn ids_stay_unique_within_the_same_millisecond() {
        let mut ledger = RequestLedger::new();
        let now = at(1_700_000_000_000);
        let mut ids = Vec::new();
        for i in 0..5 {
            let id = ledger
                .create_request_at(&session(), &draft("moving", &format!("job {i}")), vec![], now)
                .unwrap()
                .id;
            ids.push(id);
        }
        assert_eq!(ids[0], RequestId(1_700_000_000_000));
        for pair in ids.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn ids_never_go_backwards_with_clock_skew() {
        let mut ledger = RequestLedger::new();
        let first = ledger
            .create_request_at(&session(), &draft("moving", "a"), vec![], at(2_000))
            .unwrap()
            .id;
        let second = ledger
            .create_request_at(&session(), &draft("moving", "b"), vec![], at(1_000))
            .unwrap()
            .id;
        assert!(second > first);
    }

    #[test]
    fn invalid_draft_stores_nothing() {
        let mut ledger = RequestLedger::new();
        let mut bad = draft("cleaning", "");
        assert!(matches!(
            ledger.create_request(&session(), &bad, vec![]),
            Err(BoardError::Validation(ValidationError::EmptyTitle))
        ));
        bad.title = "ok".into();
        bad.budget = "lots".into();
        assert!(matches!(
            ledger.create_request(&session(), &bad, vec![]),
            Err(BoardError::Validation(ValidationError::InvalidBudget(_)))
        ));
        assert!(ledger.is_empty());
    }

    #[test]
    fn create_requires_connection() {
        let mut ledger = RequestLedger::new();
        let offline = ConnectionState::new(crate::environment::Environment::Extension);
        assert_eq!(
            ledger
                .create_request(&offline, &draft("cleaning", "x"), vec![])
                .unwrap_err(),
            BoardError::NotConnected
        );
        assert!(ledger.is_empty());
    }

    #[test]
    fn listing_filters_and_keeps_order() {
        let mut ledger = RequestLedger::new();
        for (category, title) in [
            ("cleaning", "c1"),
            ("plumbing", "p1"),
            ("cleaning", "c2"),
            ("moving", "m1"),
            ("cleaning", "c3"),
        ] {
            ledger
                .create_request(&session(), &draft(category, title), vec![])
                .unwrap();
        }

        let cleaning = CategoryFilter::Only(ServiceCategory::Cleaning);
        let titles: Vec<_> = ledger
            .list_requests(&cleaning)
            .map(|r| r.title.as_str())
            .collect();
        assert_eq!(titles, ["c1", "c2", "c3"]);

        let all: Vec<_> = ledger
            .list_requests(&CategoryFilter::All)
            .map(|r| r.title.as_str())
            .collect();
        assert_eq!(all, ["c1", "p1", "c2", "m1", "c3"]);

        let none = CategoryFilter::Only(ServiceCategory::Tutoring);
        assert_eq!(ledger.list_requests(&none).count(), 0);
    }

    #[test]
    fn bids_append_in_order_and_allow_repeats() {
        let mut ledger = RequestLedger::new();
        let id = ledger
            .create_request(&session(), &draft("cleaning", "x"), vec![])
            .unwrap()
            .id;

        for amount in [40.0, 35.0, 35.0] {
            ledger
                .place_bid(&session(), id, amount, Some("I can do it"))
                .unwrap();
        }

        let request = ledger.get_request(id).unwrap();
        let amounts: Vec<f64> = request.bids.iter().map(|b| b.amount).collect();
        assert_eq!(amounts, [40.0, 35.0, 35.0]);
        assert!(request.bids.iter().all(|b| b.bidder == request.requester));
        assert_eq!(request.lowest_bid().map(|b| b.amount), Some(35.0));
    }

    #[test]
    fn invalid_bid_amounts_change_nothing() {
        let mut ledger = RequestLedger::new();
        let id = ledger
            .create_request(&session(), &draft("cleaning", "x"), vec![])
            .unwrap()
            .id;

        for amount in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                ledger.place_bid(&session(), id, amount, None),
                Err(BoardError::Validation(ValidationError::InvalidBidAmount(_)))
            ));
        }
        for raw in ["", "abc", "0", "-2"] {
            assert!(matches!(
                ledger.place_bid_input(&session(), id, raw, None),
                Err(BoardError::Validation(ValidationError::InvalidBidAmount(_)))
            ));
        }
        assert_eq!(ledger.get_request(id).unwrap().bid_count(), 0);
    }

    #[test]
    fn bid_on_unknown_request_is_not_found() {
        let mut ledger = RequestLedger::new();
        ledger
            .create_request(&session(), &draft("cleaning", "x"), vec![])
            .unwrap();
        let missing = RequestId(7);
        assert_eq!(
            ledger.place_bid(&session(), missing, 10.0, None).unwrap_err(),
            BoardError::RequestNotFound(missing)
        );
        assert!(ledger.iter().all(|r| r.bids.is_empty()));
    }

    #[test]
    fn bids_require_connection() {
        let mut ledger = RequestLedger::new();
        let id = ledger
            .create_request(&session(), &draft("cleaning", "x"), vec![])
            .unwrap()
            .id;
        let offline = ConnectionState::new(crate::environment::Environment::Extension);

        assert_eq!(
            ledger.place_bid(&offline, id, 40.0, None).unwrap_err(),
            BoardError::NotConnected
        );
        // Checked before the amount is parsed.
        assert_eq!(
            ledger.place_bid_input(&offline, id, "abc", None).unwrap_err(),
            BoardError::NotConnected
        );
        assert_eq!(ledger.get_request(id).unwrap().bid_count(), 0);
    }

    #[test]
    fn id_bump_saturates_at_the_top() {
        let mut ledger = RequestLedger {
            requests: Vec::new(),
            last_id: u64::MAX,
        };
        let id = ledger
            .create_request_at(&session(), &draft("moving", "a"), vec![], at(1_000))
            .unwrap()
            .id;
        assert_eq!(id, RequestId(u64::MAX));
    }

    #[test]
    fn bid_message_is_trimmed() {
        let mut ledger = RequestLedger::new();
        let id = ledger
            .create_request(&session(), &draft("cleaning", "x"), vec![])
            .unwrap()
            .id;
        let bid = ledger
            .place_bid_input(&session(), id, " 12.5 ", Some("  soon  "))
            .unwrap();
        assert_eq!(bid.amount, 12.5);
        assert_eq!(bid.message.as_deref(), Some("soon"));
    }

    #[test]
    fn export_is_a_json_array() {
        let mut ledger = RequestLedger::new();
        ledger
            .create_request(&session(), &draft("home-repair", "Fix door"), vec![])
            .unwrap();
        let json: serde_json::Value = serde_json::from_str(&ledger.export_json().unwrap()).unwrap();
        assert_eq!(json[0]["category"], "home-repair");
        assert_eq!(json[0]["title"], "Fix door");
    }
}
