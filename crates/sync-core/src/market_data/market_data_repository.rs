use chrono::NaiveDate;
use diesel::prelude::*;
use std::sync::Arc;

use super::market_data_errors::Result;
use super::market_data_model::{HistoricalPrice, QuoteSnapshot};
use super::market_data_traits::MarketDataRepositoryTrait;
use crate::db::{get_connection, DbPool};
use crate::schema::{historical_price, quote_data};

pub struct MarketDataRepository {
    pool: Arc<DbPool>,
}

impl MarketDataRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

impl MarketDataRepositoryTrait for MarketDataRepository {
    fn get_last_price_date(&self, ticker: &str) -> Result<Option<NaiveDate>> {
        let mut conn = get_connection(&self.pool)?;

        historical_price::table
            .filter(historical_price::ticker.eq(ticker))
            .select(diesel::dsl::max(historical_price::price_date))
            .first::<Option<NaiveDate>>(&mut conn)
            .map_err(Into::into)
    }

    fn save_quote(&self, quote: &QuoteSnapshot) -> Result<()> {
        let mut conn = get_connection(&self.pool)?;

        // REPLACE INTO overwrites every column, so a snapshot upsert and a
        // plain insert are the same statement. last_updated is server time.
        diesel::replace_into(quote_data::table)
            .values((
                quote_data::ticker.eq(&quote.ticker),
                quote_data::name.eq(&quote.name),
                quote_data::currency.eq(&quote.currency),
                quote_data::current_price.eq(quote.current_price),
                quote_data::change_amount.eq(quote.change_amount),
                quote_data::change_percent.eq(quote.change_percent),
                quote_data::previous_close.eq(quote.previous_close),
                quote_data::day_high.eq(quote.day_high),
                quote_data::day_low.eq(quote.day_low),
                quote_data::volume.eq(quote.volume),
                quote_data::last_updated.eq(diesel::dsl::now),
            ))
            .execute(&mut conn)?;

        Ok(())
    }

    fn save_historical_prices(&self, prices: &[HistoricalPrice]) -> Result<()> {
        if prices.is_empty() {
            return Ok(());
        }

        let mut conn = get_connection(&self.pool)?;

        conn.transaction(|conn| {
            diesel::replace_into(historical_price::table)
                .values(prices)
                .execute(conn)
        })?;

        Ok(())
    }
}
