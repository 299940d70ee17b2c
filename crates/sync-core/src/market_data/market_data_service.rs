use std::sync::Arc;

use chrono::Duration;
use log::{error, info, warn};
use rust_decimal::Decimal;

use super::market_data_constants::SYNC_OVERLAP_DAYS;
use super::market_data_model::{
    classify_currency, HistoricalPrice, ProviderQuote, QuoteSnapshot, SyncReport, TickerSyncOutcome,
};
use super::market_data_traits::MarketDataRepositoryTrait;
use super::providers::market_data_provider::MarketDataProvider;
use crate::market_data::market_data_errors::Result;
use crate::utils::decimal_utils::{quantize, sanitize_price};

/// Per-ticker synchronizer and the sequential driver loop over the
/// instrument universe. Tickers are processed strictly one at a time; no
/// failure crosses a ticker boundary.
pub struct MarketDataService {
    provider: Arc<dyn MarketDataProvider>,
    repository: Arc<dyn MarketDataRepositoryTrait>,
}

impl MarketDataService {
    pub fn new(
        provider: Arc<dyn MarketDataProvider>,
        repository: Arc<dyn MarketDataRepositoryTrait>,
    ) -> Self {
        MarketDataService {
            provider,
            repository,
        }
    }

    /// Synchronize every ticker in order, collecting per-ticker outcomes.
    /// Individual failures are logged and reported, never propagated.
    pub async fn sync_all(&self, tickers: &[&str]) -> SyncReport {
        info!(
            "Initializing market data engine. Target tickers: {}",
            tickers.len()
        );

        let mut report = SyncReport::default();
        for ticker in tickers {
            let outcome = self.sync_ticker(ticker).await;
            report.outcomes.push((ticker.to_string(), outcome));
        }

        info!(
            "Global market data sync completed. Synced: {}, skipped: {}, failed: {}.",
            report.synced(),
            report.skipped(),
            report.failed()
        );
        report
    }

    pub async fn sync_ticker(&self, ticker: &str) -> TickerSyncOutcome {
        match self.sync_ticker_inner(ticker).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("[{}] Sync failed. Reason: {}", ticker, e);
                TickerSyncOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn sync_ticker_inner(&self, ticker: &str) -> Result<TickerSyncOutcome> {
        // A failed lookup degrades to the full-history strategy instead of
        // aborting the ticker.
        let last_date = match self.repository.get_last_price_date(ticker) {
            Ok(date) => date,
            Err(e) => {
                warn!("[{}] Could not fetch last stored date: {}", ticker, e);
                None
            }
        };

        let history = match last_date {
            None => {
                info!("[{}] Status: NEW. Strategy: full history fetch.", ticker);
                self.provider.get_full_history(ticker).await?
            }
            Some(date) => {
                let fetch_start = date - Duration::days(SYNC_OVERLAP_DAYS);
                info!(
                    "[{}] Status: ACTIVE. Last date: {}. Strategy: sync from {}.",
                    ticker, date, fetch_start
                );
                self.provider.get_history_since(ticker, fetch_start).await?
            }
        };

        if history.is_empty() {
            warn!("[{}] Provider returned no data. Skipping.", ticker);
            return Ok(TickerSyncOutcome::SkippedEmpty);
        }

        let snapshot = build_snapshot(ticker, &history);
        self.repository.save_quote(&snapshot)?;

        let prices: Vec<HistoricalPrice> = history
            .iter()
            .filter_map(|row| {
                sanitize_price(Some(row.close)).map(|close_price| HistoricalPrice {
                    ticker: ticker.to_string(),
                    price_date: row.date,
                    close_price,
                })
            })
            .collect();
        let days_upserted = prices.len();
        self.repository.save_historical_prices(&prices)?;

        info!("[{}] Sync successful. History updated.", ticker);
        Ok(TickerSyncOutcome::Synced { days_upserted })
    }
}

/// Assemble the snapshot row from a non-empty fetched series. The latest
/// row is "current"; the second-to-last row of the window, when present,
/// supplies the previous close.
fn build_snapshot(ticker: &str, history: &[ProviderQuote]) -> QuoteSnapshot {
    let latest = &history[history.len() - 1];
    let previous = (history.len() >= 2).then(|| &history[history.len() - 2]);

    let current_price = sanitize_price(Some(latest.close));
    let previous_close = previous.and_then(|row| sanitize_price(Some(row.close)));
    let (change_amount, change_percent) = compute_change(current_price, previous_close);

    QuoteSnapshot {
        ticker: ticker.to_string(),
        name: ticker.to_string(),
        currency: classify_currency(ticker).to_string(),
        current_price,
        change_amount,
        change_percent,
        previous_close,
        day_high: sanitize_price(Some(latest.high)),
        day_low: sanitize_price(Some(latest.low)),
        volume: latest.volume as i64,
    }
}

/// Derived change fields, computed entirely in decimal arithmetic. Both are
/// null unless the current price and a non-zero previous close are present.
fn compute_change(
    current: Option<Decimal>,
    previous: Option<Decimal>,
) -> (Option<Decimal>, Option<Decimal>) {
    match (current, previous) {
        (Some(current), Some(previous)) if !previous.is_zero() => {
            let amount = quantize(current - previous);
            let percent = quantize(amount / previous * Decimal::ONE_HUNDRED);
            (Some(amount), Some(percent))
        }
        _ => (None, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use std::sync::Mutex;

    use crate::market_data::market_data_errors::MarketDataError;

    #[derive(Debug, Clone, PartialEq)]
    enum FetchRequest {
        Full(String),
        Since(String, NaiveDate),
    }

    #[derive(Default)]
    struct FakeProvider {
        rows: Vec<ProviderQuote>,
        requests: Mutex<Vec<FetchRequest>>,
    }

    #[async_trait::async_trait]
    impl MarketDataProvider for FakeProvider {
        async fn get_full_history(&self, symbol: &str) -> Result<Vec<ProviderQuote>> {
            self.requests
                .lock()
                .unwrap()
                .push(FetchRequest::Full(symbol.to_string()));
            Ok(self.rows.clone())
        }

        async fn get_history_since(
            &self,
            symbol: &str,
            start: NaiveDate,
        ) -> Result<Vec<ProviderQuote>> {
            self.requests
                .lock()
                .unwrap()
                .push(FetchRequest::Since(symbol.to_string(), start));
            Ok(self.rows.clone())
        }
    }

    #[derive(Default)]
    struct FakeRepository {
        last_date: Option<NaiveDate>,
        fail_date_lookup: bool,
        fail_writes_for: Option<String>,
        saved_quotes: Mutex<Vec<QuoteSnapshot>>,
        saved_history: Mutex<Vec<HistoricalPrice>>,
    }

    impl MarketDataRepositoryTrait for FakeRepository {
        fn get_last_price_date(&self, _ticker: &str) -> Result<Option<NaiveDate>> {
            if self.fail_date_lookup {
                return Err(MarketDataError::Unknown("date lookup failed".to_string()));
            }
            Ok(self.last_date)
        }

        fn save_quote(&self, quote: &QuoteSnapshot) -> Result<()> {
            if self.fail_writes_for.as_deref() == Some(quote.ticker.as_str()) {
                return Err(MarketDataError::Unknown("write failed".to_string()));
            }
            self.saved_quotes.lock().unwrap().push(quote.clone());
            Ok(())
        }

        fn save_historical_prices(&self, prices: &[HistoricalPrice]) -> Result<()> {
            if let Some(ticker) = self.fail_writes_for.as_deref() {
                if prices.iter().any(|p| p.ticker == ticker) {
                    return Err(MarketDataError::Unknown("write failed".to_string()));
                }
            }
            self.saved_history.lock().unwrap().extend_from_slice(prices);
            Ok(())
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn row(date: NaiveDate, close: f64) -> ProviderQuote {
        ProviderQuote {
            date,
            close,
            high: close + 1.0,
            low: close - 1.0,
            volume: 1_000,
        }
    }

    fn service(
        provider: Arc<FakeProvider>,
        repository: Arc<FakeRepository>,
    ) -> MarketDataService {
        MarketDataService::new(provider, repository)
    }

    #[tokio::test]
    async fn new_ticker_requests_full_history() {
        let provider = Arc::new(FakeProvider {
            rows: vec![row(day(2025, 8, 4), 100.0), row(day(2025, 8, 5), 110.0)],
            ..Default::default()
        });
        let repository = Arc::new(FakeRepository::default());

        let outcome = service(provider.clone(), repository.clone())
            .sync_ticker("^GSPC")
            .await;

        assert_eq!(outcome, TickerSyncOutcome::Synced { days_upserted: 2 });
        assert_eq!(
            *provider.requests.lock().unwrap(),
            vec![FetchRequest::Full("^GSPC".to_string())]
        );
    }

    #[tokio::test]
    async fn active_ticker_requests_overlap_window() {
        let provider = Arc::new(FakeProvider {
            rows: vec![row(day(2025, 8, 5), 110.0)],
            ..Default::default()
        });
        let repository = Arc::new(FakeRepository {
            last_date: Some(day(2025, 8, 4)),
            ..Default::default()
        });

        service(provider.clone(), repository)
            .sync_ticker("GC=F")
            .await;

        assert_eq!(
            *provider.requests.lock().unwrap(),
            vec![FetchRequest::Since("GC=F".to_string(), day(2025, 7, 28))]
        );
    }

    #[tokio::test]
    async fn failed_date_lookup_degrades_to_full_fetch() {
        let provider = Arc::new(FakeProvider {
            rows: vec![row(day(2025, 8, 5), 110.0)],
            ..Default::default()
        });
        let repository = Arc::new(FakeRepository {
            fail_date_lookup: true,
            ..Default::default()
        });

        let outcome = service(provider.clone(), repository)
            .sync_ticker("^N225")
            .await;

        assert!(matches!(outcome, TickerSyncOutcome::Synced { .. }));
        assert_eq!(
            *provider.requests.lock().unwrap(),
            vec![FetchRequest::Full("^N225".to_string())]
        );
    }

    #[tokio::test]
    async fn empty_series_skips_without_writes() {
        let provider = Arc::new(FakeProvider::default());
        let repository = Arc::new(FakeRepository::default());

        let outcome = service(provider, repository.clone())
            .sync_ticker("^STI")
            .await;

        assert_eq!(outcome, TickerSyncOutcome::SkippedEmpty);
        assert!(repository.saved_quotes.lock().unwrap().is_empty());
        assert!(repository.saved_history.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn change_fields_are_computed_in_decimal() {
        let provider = Arc::new(FakeProvider {
            rows: vec![row(day(2025, 8, 4), 100.0), row(day(2025, 8, 5), 110.0)],
            ..Default::default()
        });
        let repository = Arc::new(FakeRepository::default());

        service(provider, repository.clone())
            .sync_ticker("^GSPC")
            .await;

        let quotes = repository.saved_quotes.lock().unwrap();
        let snapshot = &quotes[0];
        assert_eq!(snapshot.current_price, Some(dec!(110.00000000)));
        assert_eq!(snapshot.previous_close, Some(dec!(100.00000000)));
        assert_eq!(snapshot.change_amount, Some(dec!(10.00000000)));
        assert_eq!(snapshot.change_percent, Some(dec!(10.00000000)));
        assert_eq!(snapshot.currency, "USD");
        assert_eq!(snapshot.volume, 1_000);
    }

    #[tokio::test]
    async fn single_row_window_has_no_derived_fields() {
        let provider = Arc::new(FakeProvider {
            rows: vec![row(day(2025, 8, 5), 110.0)],
            ..Default::default()
        });
        let repository = Arc::new(FakeRepository::default());

        service(provider, repository.clone())
            .sync_ticker("BTC-INR")
            .await;

        let quotes = repository.saved_quotes.lock().unwrap();
        let snapshot = &quotes[0];
        assert_eq!(snapshot.previous_close, None);
        assert_eq!(snapshot.change_amount, None);
        assert_eq!(snapshot.change_percent, None);
        assert_eq!(snapshot.currency, "INR");
    }

    #[tokio::test]
    async fn zero_previous_close_yields_null_change() {
        let provider = Arc::new(FakeProvider {
            rows: vec![row(day(2025, 8, 4), 0.0), row(day(2025, 8, 5), 110.0)],
            ..Default::default()
        });
        let repository = Arc::new(FakeRepository::default());

        service(provider, repository.clone())
            .sync_ticker("NG=F")
            .await;

        let quotes = repository.saved_quotes.lock().unwrap();
        let snapshot = &quotes[0];
        assert_eq!(snapshot.previous_close, Some(dec!(0.00000000)));
        assert_eq!(snapshot.change_amount, None);
        assert_eq!(snapshot.change_percent, None);
    }

    #[tokio::test]
    async fn unstorable_closes_are_filtered_from_history() {
        let provider = Arc::new(FakeProvider {
            rows: vec![row(day(2025, 8, 4), 100.0), row(day(2025, 8, 5), f64::NAN)],
            ..Default::default()
        });
        let repository = Arc::new(FakeRepository::default());

        let outcome = service(provider, repository.clone())
            .sync_ticker("^HSI")
            .await;

        assert_eq!(outcome, TickerSyncOutcome::Synced { days_upserted: 1 });
        let history = repository.saved_history.lock().unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].price_date, day(2025, 8, 4));

        let quotes = repository.saved_quotes.lock().unwrap();
        let snapshot = &quotes[0];
        assert_eq!(snapshot.current_price, None);
        assert_eq!(snapshot.change_amount, None);
        assert_eq!(snapshot.change_percent, None);
    }

    #[tokio::test]
    async fn write_failure_does_not_stop_the_loop() {
        let provider = Arc::new(FakeProvider {
            rows: vec![row(day(2025, 8, 4), 100.0), row(day(2025, 8, 5), 110.0)],
            ..Default::default()
        });
        let repository = Arc::new(FakeRepository {
            fail_writes_for: Some("^GSPC".to_string()),
            ..Default::default()
        });

        let report = service(provider, repository.clone())
            .sync_all(&["^GSPC", "^DJI"])
            .await;

        assert_eq!(report.failed(), 1);
        assert_eq!(report.synced(), 1);
        assert!(matches!(
            report.outcomes[0].1,
            TickerSyncOutcome::Failed { .. }
        ));
        assert!(matches!(
            report.outcomes[1].1,
            TickerSyncOutcome::Synced { .. }
        ));

        let quotes = repository.saved_quotes.lock().unwrap();
        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].ticker, "^DJI");
    }

    #[test]
    fn compute_change_requires_both_sides() {
        assert_eq!(compute_change(None, Some(dec!(100))), (None, None));
        assert_eq!(compute_change(Some(dec!(110)), None), (None, None));
        assert_eq!(compute_change(Some(dec!(110)), Some(dec!(0))), (None, None));
    }

    #[test]
    fn compute_change_example() {
        let (amount, percent) =
            compute_change(Some(dec!(110.00000000)), Some(dec!(100.00000000)));
        assert_eq!(amount, Some(dec!(10.00000000)));
        assert_eq!(percent, Some(dec!(10.00000000)));
    }
}
