pub mod constants;
pub mod db;
pub mod errors;
pub mod market_data;
pub mod schema;
pub mod utils;

pub use errors::{Error, Result};
pub use market_data::{MarketDataService, SyncReport, TickerSyncOutcome};
