use std::time::SystemTime;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use log::debug;
use time::OffsetDateTime;
use yahoo_finance_api as yahoo;

use super::market_data_provider::MarketDataProvider;
use crate::market_data::market_data_errors::Result;
use crate::market_data::market_data_model::ProviderQuote;

/// Daily-bar interval requested from the chart endpoint
const DAILY_INTERVAL: &str = "1d";

/// Range keyword for the provider's full available history
const FULL_RANGE: &str = "max";

pub struct YahooProvider {
    provider: yahoo::YahooConnector,
}

impl YahooProvider {
    pub fn new() -> Result<Self> {
        let provider = yahoo::YahooConnector::new()?;
        Ok(YahooProvider { provider })
    }

    /// Flatten a chart response into dated daily rows. A series the
    /// provider reports as empty becomes an empty vector.
    fn collect_daily_rows(symbol: &str, response: &yahoo::YResponse) -> Result<Vec<ProviderQuote>> {
        let quotes = match response.quotes() {
            Ok(quotes) => quotes,
            Err(e) if is_empty_series(&e) => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut rows = Vec::with_capacity(quotes.len());
        for quote in quotes {
            match chrono::DateTime::from_timestamp(quote.timestamp as i64, 0) {
                Some(datetime) => rows.push(ProviderQuote {
                    date: datetime.naive_utc().date(),
                    close: quote.close,
                    high: quote.high,
                    low: quote.low,
                    volume: quote.volume,
                }),
                None => debug!(
                    "[{}] dropping row with unrepresentable timestamp {}",
                    symbol, quote.timestamp
                ),
            }
        }

        Ok(rows)
    }
}

#[async_trait]
impl MarketDataProvider for YahooProvider {
    async fn get_full_history(&self, symbol: &str) -> Result<Vec<ProviderQuote>> {
        let response = match self
            .provider
            .get_quote_range(symbol, DAILY_INTERVAL, FULL_RANGE)
            .await
        {
            Ok(response) => response,
            Err(e) if is_empty_series(&e) => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        Self::collect_daily_rows(symbol, &response)
    }

    async fn get_history_since(&self, symbol: &str, start: NaiveDate) -> Result<Vec<ProviderQuote>> {
        let start_time: SystemTime = Utc
            .from_utc_datetime(&start.and_time(NaiveTime::MIN))
            .into();
        let start_offset: OffsetDateTime = start_time.into();
        let end_offset: OffsetDateTime = SystemTime::now().into();

        let response = match self
            .provider
            .get_quote_history(symbol, start_offset, end_offset)
            .await
        {
            Ok(response) => response,
            Err(e) if is_empty_series(&e) => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        Self::collect_daily_rows(symbol, &response)
    }
}

fn is_empty_series(error: &yahoo::YahooError) -> bool {
    matches!(
        error,
        yahoo::YahooError::NoQuotes | yahoo::YahooError::NoResult
    )
}
