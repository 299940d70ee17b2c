use chrono::NaiveDate;
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::market_data::market_data_constants::{CURRENCY_INR, CURRENCY_USD};

/// One raw daily row as returned by a provider, pre-sanitization.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderQuote {
    pub date: NaiveDate,
    pub close: f64,
    pub high: f64,
    pub low: f64,
    pub volume: u64,
}

/// Current-state snapshot for one ticker. `last_updated` is assigned by the
/// datastore at write time and is not part of the domain model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSnapshot {
    pub ticker: String,
    pub name: String,
    pub currency: String,
    pub current_price: Option<Decimal>,
    pub change_amount: Option<Decimal>,
    pub change_percent: Option<Decimal>,
    pub previous_close: Option<Decimal>,
    pub day_high: Option<Decimal>,
    pub day_low: Option<Decimal>,
    pub volume: i64,
}

/// Database model for one (ticker, date, close) history point
#[derive(Debug, Clone, PartialEq, Queryable, Insertable, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[diesel(table_name = crate::schema::historical_price)]
pub struct HistoricalPrice {
    pub ticker: String,
    pub price_date: NaiveDate,
    pub close_price: Decimal,
}

/// Per-ticker result handed back to the driver loop. Failures are values,
/// never panics or propagated errors, so one bad ticker cannot abort the run.
#[derive(Debug, Clone, PartialEq)]
pub enum TickerSyncOutcome {
    Synced { days_upserted: usize },
    SkippedEmpty,
    Failed { reason: String },
}

#[derive(Debug, Default)]
pub struct SyncReport {
    pub outcomes: Vec<(String, TickerSyncOutcome)>,
}

impl SyncReport {
    pub fn synced(&self) -> usize {
        self.count(|o| matches!(o, TickerSyncOutcome::Synced { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, TickerSyncOutcome::SkippedEmpty))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, TickerSyncOutcome::Failed { .. }))
    }

    fn count(&self, pred: impl Fn(&TickerSyncOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|(_, o)| pred(o)).count()
    }
}

/// Tickers quoted in Indian rupees carry the currency in their symbol text;
/// everything else in the universe trades in US dollars.
pub fn classify_currency(ticker: &str) -> &'static str {
    if ticker.contains(CURRENCY_INR) {
        CURRENCY_INR
    } else {
        CURRENCY_USD
    }
}
