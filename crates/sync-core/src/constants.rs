/// Decimal precision for stored prices and derived fields
pub const PRICE_DECIMAL_PRECISION: u32 = 8;

/// Component tag used in every log line
pub const LOG_COMPONENT_TAG: &str = "MarketData";

/// The fixed instrument universe: equity indices, commodity futures,
/// currency pairs and cryptocurrency pairs.
pub const TICKERS: [&str; 36] = [
    "^GSPC",
    "^DJI",
    "^IXIC",
    "^RUT",
    "^VIX",
    "^NYA",
    "^GDAXI",
    "^FTSE",
    "^FCHI",
    "^IBEX",
    "^STOXX50E",
    "^NSEI",
    "^BSESN",
    "^NSEBANK",
    "^CNXIT",
    "^BSESCP",
    "^HSI",
    "^N225",
    "^STI",
    "000001.SS",
    "GC=F",
    "SI=F",
    "CL=F",
    "NG=F",
    "HG=F",
    "USDINR=X",
    "EURINR=X",
    "JPYINR=X",
    "GBPINR=X",
    "AUDINR=X",
    "EURUSD=X",
    "BTC-INR",
    "ETH-INR",
    "SOL-INR",
    "XRP-INR",
    "DOGE-INR",
];
