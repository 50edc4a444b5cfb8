//! Meter readings.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{BillingError, Result};
use crate::money::round_quantity;

/// Opening and closing values of one utility meter over a billing period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawReading")]
pub struct MeterReading {
    opening: Decimal,
    closing: Decimal,
}

impl MeterReading {
    /// Create a reading.
    ///
    /// Both values are rounded to 4 fractional digits before validation.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if either value is negative or `closing` is
    /// below `opening`.
    pub fn create(opening: Decimal, closing: Decimal) -> Result<Self> {
        let opening = round_quantity(opening);
        let closing = round_quantity(closing);

        if opening < Decimal::ZERO {
            return Err(BillingError::invalid("opening", "must not be negative"));
        }
        if closing < Decimal::ZERO {
            return Err(BillingError::invalid("closing", "must not be negative"));
        }
        if closing < opening {
            return Err(BillingError::invalid(
                "closing",
                format!("{closing} is below opening reading {opening}"),
            ));
        }

        Ok(Self { opening, closing })
    }

    /// The opening meter value.
    #[must_use]
    pub const fn opening(&self) -> Decimal {
        self.opening
    }

    /// The closing meter value.
    #[must_use]
    pub const fn closing(&self) -> Decimal {
        self.closing
    }

    /// Units consumed over the period.
    #[must_use]
    pub fn units_used(&self) -> Decimal {
        self.closing - self.opening
    }
}

#[derive(Deserialize)]
struct RawReading {
    opening: Decimal,
    closing: Decimal,
}

impl TryFrom<RawReading> for MeterReading {
    type Error = BillingError;

    fn try_from(raw: RawReading) -> Result<Self> {
        Self::create(raw.opening, raw.closing)
    }
}
