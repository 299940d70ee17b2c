use diesel::result::Error as DieselError;
use thiserror::Error;

use crate::market_data::MarketDataError;

// Create a type alias for Result using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the sync engine
#[derive(Error, Debug)]
pub enum Error {
    #[error("Database operation failed: {0}")]
    Database(#[from] DatabaseError),

    #[error("Configuration failed: {0}")]
    Config(#[from] ConfigError),

    #[error("Market data operation failed: {0}")]
    MarketData(#[from] MarketDataError),
}

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Unsupported database URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(#[from] diesel::result::ConnectionError),

    #[error("Failed to create database pool: {0}")]
    PoolCreationFailed(#[from] r2d2::Error),

    #[error("Database query failed: {0}")]
    QueryFailed(#[from] DieselError),

    #[error("Database migration failed: {0}")]
    MigrationFailed(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Database credentials not found in environment or arguments")]
    MissingCredentials,
}

impl From<DieselError> for Error {
    fn from(err: DieselError) -> Self {
        Error::Database(DatabaseError::QueryFailed(err))
    }
}

impl From<r2d2::Error> for Error {
    fn from(e: r2d2::Error) -> Self {
        Error::Database(DatabaseError::PoolCreationFailed(e))
    }
}
