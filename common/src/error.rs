use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::request::RequestId;

/// A form field failed validation. The operation is aborted with no state change.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ValidationError {
    #[error("category is required")]
    MissingCategory,
    #[error("unknown category: {0}")]
    UnknownCategory(String),
    #[error("title is required")]
    EmptyTitle,
    #[error("description is required")]
    EmptyDescription,
    #[error("budget must be a non-negative number, got {0:?}")]
    InvalidBudget(String),
    #[error("location is required")]
    EmptyLocation,
    #[error("bid amount must be a positive number, got {0:?}")]
    InvalidBidAmount(String),
}

impl ValidationError {
    pub fn user_notice(&self) -> &'static str {
        match self {
            ValidationError::InvalidBidAmount(_) => "Please enter a valid bid amount.",
            _ => "Please fill in all required fields.",
        }
    }
}

/// Failures reported by, or about, the wallet provider.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ProviderError {
    #[error("no wallet provider available")]
    WalletMissing,
    #[error("wallet returned no accounts")]
    NoAccounts,
    #[error("request rejected: {0}")]
    Rejected(String),
    #[error("switch to chain {chain_id} rejected: {reason}")]
    SwitchRejected { chain_id: u64, reason: String },
    #[error("provider unavailable: {0}")]
    Unavailable(String),
}

impl ProviderError {
    pub fn user_notice(&self) -> String {
        match self {
            ProviderError::WalletMissing => {
                "A wallet such as MetaMask is required to use this application. Please install one and reload."
                    .to_string()
            }
            ProviderError::NoAccounts => {
                "Your wallet did not share an account. Please unlock it and try again.".to_string()
            }
            ProviderError::Rejected(_) | ProviderError::Unavailable(_) => {
                "Could not connect to your wallet. Please try again.".to_string()
            }
            ProviderError::SwitchRejected { chain_id, .. } => format!(
                "Please switch to {} in your wallet.",
                crate::provider::chain_name(*chain_id)
            ),
        }
    }
}

/// Every failure the board can surface to the user. None of them are fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum BoardError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("wallet not connected")]
    NotConnected,
    #[error("wallet provider: {0}")]
    Provider(#[from] ProviderError),
    #[error("service request {0} not found")]
    RequestNotFound(RequestId),
}

impl BoardError {
    /// Message shown to the user when this error aborts an action.
    pub fn user_notice(&self) -> String {
        match self {
            BoardError::Validation(e) => e.user_notice().to_string(),
            BoardError::NotConnected => "Please connect your wallet first.".to_string(),
            BoardError::Provider(e) => e.user_notice(),
            BoardError::RequestNotFound(_) => {
                "That service request no longer exists.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notices_match_error_kind() {
        assert_eq!(
            BoardError::NotConnected.user_notice(),
            "Please connect your wallet first."
        );
        assert_eq!(
            BoardError::from(ValidationError::EmptyTitle).user_notice(),
            "Please fill in all required fields."
        );
        assert_eq!(
            BoardError::from(ValidationError::InvalidBidAmount("-1".into())).user_notice(),
            "Please enter a valid bid amount."
        );
        assert_eq!(
            BoardError::from(ProviderError::SwitchRejected {
                chain_id: 1,
                reason: "user denied".into(),
            })
            .user_notice(),
            "Please switch to Ethereum Mainnet in your wallet."
        );
    }

    #[test]
    fn display_includes_cause() {
        let err = BoardError::RequestNotFound(RequestId(42));
        assert_eq!(err.to_string(), "service request 42 not found");

        let err = BoardError::from(ProviderError::Rejected("User rejected the request.".into()));
        assert_eq!(
            err.to_string(),
            "wallet provider: request rejected: User rejected the request."
        );
    }
}
