use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

use crate::constants::PRICE_DECIMAL_PRECISION;

/// Quantize a decimal to the storage precision, rounding half-up. The
/// result always carries exactly eight fractional digits.
pub fn quantize(value: Decimal) -> Decimal {
    let mut quantized =
        value.round_dp_with_strategy(PRICE_DECIMAL_PRECISION, RoundingStrategy::MidpointAwayFromZero);
    quantized.rescale(PRICE_DECIMAL_PRECISION);
    quantized
}

/// Convert a raw provider value into a storage-safe decimal.
///
/// Missing values, NaN and infinities become `None`. Finite values are
/// converted through their string representation so the stored decimal is
/// independent of the host's binary float representation, then quantized.
pub fn sanitize_price(value: Option<f64>) -> Option<Decimal> {
    let raw = value?;
    if raw.is_nan() || raw.is_infinite() {
        return None;
    }
    sanitize_price_repr(&raw.to_string())
}

/// String-input leg of the sanitizer contract. Unparseable input is `None`,
/// never an error.
pub fn sanitize_price_repr(repr: &str) -> Option<Decimal> {
    Decimal::from_str(repr.trim()).ok().map(quantize)
}
