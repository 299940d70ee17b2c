/// Currency codes assigned by ticker classification
pub const CURRENCY_INR: &str = "INR";
pub const CURRENCY_USD: &str = "USD";

/// Calendar days of overlap requested before the last stored date, so the
/// previous-close computation sees a real prior row and recently stored
/// days self-correct on re-fetch.
pub const SYNC_OVERLAP_DAYS: i64 = 7;
