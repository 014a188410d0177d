pub mod board;
pub mod category;
pub mod config;
pub mod connection;
pub mod currency;
pub mod environment;
pub mod error;
pub mod identity;
pub mod ledger;
pub mod media;
pub mod provider;
pub mod request;

pub use board::Board;
pub use error::{BoardError, ProviderError, ValidationError};
