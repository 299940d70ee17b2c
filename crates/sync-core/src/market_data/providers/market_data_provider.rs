use async_trait::async_trait;
use chrono::NaiveDate;

use crate::market_data::market_data_errors::Result;
use crate::market_data::market_data_model::ProviderQuote;

/// Upstream source of daily price series.
///
/// An empty series is a valid response, not an error; callers decide what
/// an empty fetch means for them.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// The provider's maximum available daily history for the symbol.
    async fn get_full_history(&self, symbol: &str) -> Result<Vec<ProviderQuote>>;

    /// Daily history from `start` (inclusive) up to now.
    async fn get_history_since(&self, symbol: &str, start: NaiveDate) -> Result<Vec<ProviderQuote>>;
}
