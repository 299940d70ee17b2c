use chrono::NaiveDate;

use super::market_data_errors::Result;
use super::market_data_model::{HistoricalPrice, QuoteSnapshot};

/// Storage seam for the synchronizer. Implementations must release their
/// connection on every exit path.
pub trait MarketDataRepositoryTrait: Send + Sync {
    /// Latest stored price date for the ticker, `None` for a new ticker.
    fn get_last_price_date(&self, ticker: &str) -> Result<Option<NaiveDate>>;

    /// Upsert the one snapshot row for the ticker. Commits on return.
    fn save_quote(&self, quote: &QuoteSnapshot) -> Result<()>;

    /// Upsert a batch of history points as a single transaction.
    fn save_historical_prices(&self, prices: &[HistoricalPrice]) -> Result<()>;
}
