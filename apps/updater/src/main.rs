mod config;

use std::io::Write;
use std::sync::Arc;

use clap::Parser;
use log::error;

use config::{Cli, Config};
use marketsync_core::constants::{LOG_COMPONENT_TAG, TICKERS};
use marketsync_core::db;
use marketsync_core::market_data::{MarketDataRepository, MarketDataService, YahooProvider};

fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] [{}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                LOG_COMPONENT_TAG,
                record.args()
            )
        })
        .init();
}

/// Bootstrap failures are fatal: log and exit non-zero before the loop
/// starts. Per-ticker failures never reach this level.
fn fatal(message: &str, err: impl std::fmt::Display) -> ! {
    error!("Fatal: {}: {}", message, err);
    std::process::exit(1);
}

#[tokio::main]
async fn main() {
    init_logging();

    let cli = Cli::parse();
    let config = Config::load(&cli)
        .unwrap_or_else(|e| fatal("could not resolve database credentials", e));

    let database_url =
        db::normalize_database_url(&config.db_url, &config.db_user, &config.db_password)
            .unwrap_or_else(|e| fatal("could not parse DB URL", e));

    let pool = db::create_pool(&database_url)
        .unwrap_or_else(|e| fatal("could not connect to the database", e));
    db::run_migrations(&pool).unwrap_or_else(|e| fatal("could not prepare the schema", e));

    let provider =
        YahooProvider::new().unwrap_or_else(|e| fatal("could not initialize the data provider", e));

    let repository = MarketDataRepository::new(pool);
    let service = MarketDataService::new(Arc::new(provider), Arc::new(repository));

    // Exit code stays 0 whatever the per-ticker outcomes; they are already
    // in the log and in the report banner.
    service.sync_all(&TICKERS).await;
}
