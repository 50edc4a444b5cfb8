//! Money and quantity precision rules.
//!
//! Readings and rates are stored at 4 fractional digits, computed costs at 2.
//! Both round midpoint away from zero, matching the storage precision the
//! persistence layer expects.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

/// VAT charged on a bill's subtotal (15%).
pub const VAT_RATE: Decimal = dec!(0.15);

/// Fractional digits kept on computed costs.
pub const MONEY_SCALE: u32 = 2;

/// Fractional digits kept on readings, limits and rates.
pub const QUANTITY_SCALE: u32 = 4;

/// Round a computed amount to the stored money precision.
///
/// The result always carries exactly two fractional digits, so `0` renders
/// as `0.00`.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    let mut rounded =
        amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(MONEY_SCALE);
    rounded
}

/// Round a reading, limit or rate to the stored quantity precision.
#[must_use]
pub fn round_quantity(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(QUANTITY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}
