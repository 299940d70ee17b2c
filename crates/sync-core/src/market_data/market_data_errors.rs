use thiserror::Error;

use crate::errors::DatabaseError;
use yahoo_finance_api::YahooError;

pub type Result<T> = std::result::Result<T, MarketDataError>;

#[derive(Error, Debug)]
pub enum MarketDataError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] diesel::result::Error),

    #[error("Database error: {0}")]
    DatabaseConnectionError(#[from] DatabaseError),

    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<YahooError> for MarketDataError {
    fn from(error: YahooError) -> Self {
        match error {
            YahooError::FetchFailed(e) => MarketDataError::ProviderError(e),
            YahooError::NoQuotes => MarketDataError::NotFound("No quotes found".to_string()),
            YahooError::NoResult => MarketDataError::NotFound("No data found".to_string()),
            _ => MarketDataError::Unknown(error.to_string()),
        }
    }
}

impl From<crate::errors::Error> for MarketDataError {
    fn from(error: crate::errors::Error) -> Self {
        match error {
            crate::errors::Error::Database(e) => MarketDataError::DatabaseConnectionError(e),
            other => MarketDataError::Unknown(other.to_string()),
        }
    }
}
