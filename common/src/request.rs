use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::category::ServiceCategory;
use crate::currency::{format_amount, parse_amount};
use crate::error::ValidationError;
use crate::identity::Address;
use crate::media::MediaItem;

/// Unique request identifier (timestamp-based, monotonically increasing).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A bid placed on a service request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bid {
    pub bidder: Address,
    /// Always finite and strictly positive.
    pub amount: f64,
    pub message: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

/// A posted service request. Only `bids` ever changes after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceRequest {
    pub id: RequestId,
    pub requester: Address,
    pub category: ServiceCategory,
    pub title: String,
    pub description: String,
    pub location: String,
    /// Always finite and non-negative.
    pub budget: f64,
    pub media: Vec<MediaItem>,
    pub bids: Vec<Bid>,
    pub created_at: DateTime<Utc>,
}

impl ServiceRequest {
    pub fn bid_count(&self) -> usize {
        self.bids.len()
    }

    pub fn lowest_bid(&self) -> Option<&Bid> {
        self.bids
            .iter()
            .min_by(|a, b| a.amount.total_cmp(&b.amount))
    }
}

/// Raw form input for a new request, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestDraft {
    pub category: String,
    pub title: String,
    pub description: String,
    pub budget: String,
    pub location: String,
}

/// Draft fields after validation: trimmed and typed.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidRequest {
    pub category: ServiceCategory,
    pub title: String,
    pub description: String,
    pub budget: f64,
    pub location: String,
}

impl RequestDraft {
    /// Check every field, returning the first failure in form order.
    pub fn validate(&self) -> Result<ValidRequest, ValidationError> {
        let category: ServiceCategory = self.category.parse()?;

        let title = self.title.trim();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }

        let description = self.description.trim();
        if description.is_empty() {
            return Err(ValidationError::EmptyDescription);
        }

        let budget = parse_amount(&self.budget)
            .filter(|b| *b >= 0.0)
            .ok_or_else(|| ValidationError::InvalidBudget(self.budget.clone()))?;

        let location = self.location.trim();
        if location.is_empty() {
            return Err(ValidationError::EmptyLocation);
        }

        Ok(ValidRequest {
            category,
            title: title.to_string(),
            description: description.to_string(),
            // normalise -0.0
            budget: budget + 0.0,
            location: location.to_string(),
        })
    }
}

/// Validate a raw bid amount: finite and strictly positive.
pub fn validate_bid_amount(raw: &str) -> Result<f64, ValidationError> {
    parse_amount(raw)
        .filter(|amount| *amount > 0.0)
        .ok_or_else(|| ValidationError::InvalidBidAmount(raw.to_string()))
}

/// Trim a bid message; blank messages are dropped.
pub fn normalize_message(message: Option<&str>) -> Option<String> {
    message
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

/// Everything the detail view shows for one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestDetail {
    pub id: RequestId,
    pub title: String,
    pub requester: String,
    pub category: String,
    pub description: String,
    pub budget: String,
    pub location: String,
    pub media: Vec<MediaItem>,
    pub bids: Vec<BidLine>,
}

/// One bid as shown in the detail view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BidLine {
    pub bidder: String,
    pub amount: String,
    pub message: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

impl RequestDetail {
    pub fn from_request(request: &ServiceRequest, currency: &str) -> Self {
        Self {
            id: request.id,
            title: request.title.clone(),
            requester: request.requester.truncated(),
            category: request.category.label(),
            description: request.description.clone(),
            budget: format_amount(request.budget, currency),
            location: request.location.clone(),
            media: request.media.clone(),
            bids: request
                .bids
                .iter()
                .map(|bid| BidLine {
                    bidder: bid.bidder.truncated(),
                    amount: format_amount(bid.amount, currency),
                    message: bid.message.clone(),
                    submitted_at: bid.submitted_at,
                })
                .collect(),
        }
    }
}
