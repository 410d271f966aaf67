//! Fixed-point amount encoding
//!
//! Amounts are `Decimal` in the API and `i64` units of 10^-4 in the store, so
//! that `amount + ?` and `SUM(...)` stay exact inside SQL.

use super::error::AggregationError;
use super::transaction::TransactionId;
use rust_decimal::Decimal;

/// Number of fractional digits kept in the store
pub const AMOUNT_SCALE: u32 = 4;

/// Convert a non-negative amount into stored units
///
/// # Errors
///
/// Returns `InvalidAmount` if the amount is negative, carries more than
/// `AMOUNT_SCALE` significant fractional digits, or does not fit in `i64` units.
pub fn to_units(amount: Decimal, tx: TransactionId) -> Result<i64, AggregationError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(AggregationError::invalid_amount(amount, tx));
    }

    let mut scaled = amount.normalize();
    if scaled.scale() > AMOUNT_SCALE {
        return Err(AggregationError::invalid_amount(amount, tx));
    }
    scaled.rescale(AMOUNT_SCALE);
    if scaled.scale() != AMOUNT_SCALE {
        return Err(AggregationError::invalid_amount(amount, tx));
    }

    i64::try_from(scaled.mantissa()).map_err(|_| AggregationError::invalid_amount(amount, tx))
}

/// Convert stored units back into a `Decimal`
pub fn from_units(units: i64) -> Decimal {
    Decimal::new(units, AMOUNT_SCALE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::str::FromStr;

    #[rstest]
    #[case::whole("500", 5_000_000)]
    #[case::four_places("1.2345", 12_345)]
    #[case::trailing_zeros("2.50000000", 25_000)]
    #[case::zero("0", 0)]
    fn test_to_units(#[case] amount: &str, #[case] expected: i64) {
        let amount = Decimal::from_str(amount).unwrap();
        assert_eq!(to_units(amount, 1).unwrap(), expected);
        assert_eq!(from_units(expected), amount.normalize());
    }

    #[rstest]
    #[case::negative("-1")]
    #[case::too_precise("0.00001")]
    #[case::too_large("79228162514264337593543950335")]
    fn test_to_units_rejects(#[case] amount: &str) {
        let amount = Decimal::from_str(amount).unwrap();
        let err = to_units(amount, 9).unwrap_err();
        assert!(matches!(err, AggregationError::InvalidAmount { tx: 9, .. }));
    }
}
