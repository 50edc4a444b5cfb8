//! Tariffs and their pricing steps.
//!
//! A [`Tariff`] is an ascending sequence of [`TariffStep`]s whose last step is
//! always unbounded, so every unit of usage falls into some tier. Flat-rate
//! tariffs are the single-step case.

use std::fmt;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::{BillingError, Result, TariffError};
use crate::money::round_quantity;

/// Upper boundary of the first tier in the municipal water/sanitation schedule.
pub const TIER_ONE_LIMIT: Decimal = dec!(6);

/// Upper boundary of the second tier in the municipal water/sanitation schedule.
pub const TIER_TWO_LIMIT: Decimal = dec!(15);

/// The upper usage boundary of a tariff step.
///
/// `Unbounded` orders above every `Bounded` limit. Serialized as the limit
/// itself, or `null` when unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "Option<Decimal>", into = "Option<Decimal>")]
pub enum StepLimit {
    /// Usage up to and including this many units.
    Bounded(Decimal),
    /// No upper limit.
    Unbounded,
}

impl StepLimit {
    /// The finite limit, if any.
    #[must_use]
    pub const fn as_bounded(&self) -> Option<Decimal> {
        match self {
            Self::Bounded(limit) => Some(*limit),
            Self::Unbounded => None,
        }
    }

    /// Whether this is the unbounded limit.
    #[must_use]
    pub const fn is_unbounded(&self) -> bool {
        matches!(self, Self::Unbounded)
    }

    /// Units that fit between `previous` and this limit; `None` means unlimited.
    #[must_use]
    pub fn capacity_above(&self, previous: Decimal) -> Option<Decimal> {
        self.as_bounded().map(|limit| limit - previous)
    }
}

impl From<Option<Decimal>> for StepLimit {
    fn from(value: Option<Decimal>) -> Self {
        value.map_or(Self::Unbounded, Self::Bounded)
    }
}

impl From<StepLimit> for Option<Decimal> {
    fn from(limit: StepLimit) -> Self {
        limit.as_bounded()
    }
}

impl fmt::Display for StepLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bounded(limit) => write!(f, "{limit}"),
            Self::Unbounded => f.write_str("unbounded"),
        }
    }
}

/// One pricing tier: usage up to `upper_limit` is billed at `rate` per unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawStep")]
pub struct TariffStep {
    upper_limit: StepLimit,
    rate: Decimal,
}

impl TariffStep {
    /// Create a step.
    ///
    /// The rate and any finite limit are rounded to 4 fractional digits.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if a bounded limit is not positive or the rate
    /// is negative.
    pub fn create(upper_limit: StepLimit, rate: Decimal) -> Result<Self> {
        let upper_limit = match upper_limit {
            StepLimit::Bounded(limit) => {
                let limit = round_quantity(limit);
                if limit <= Decimal::ZERO {
                    return Err(BillingError::invalid(
                        "upper_limit",
                        format!("{limit} must be greater than zero"),
                    ));
                }
                StepLimit::Bounded(limit)
            }
            StepLimit::Unbounded => StepLimit::Unbounded,
        };
        let rate = checked_rate("rate", rate)?;

        Ok(Self { upper_limit, rate })
    }

    /// Create a step with a finite upper limit.
    ///
    /// # Errors
    ///
    /// See [`TariffStep::create`].
    pub fn bounded(upper_limit: Decimal, rate: Decimal) -> Result<Self> {
        Self::create(StepLimit::Bounded(upper_limit), rate)
    }

    /// Create the open-ended top step.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the rate is negative.
    pub fn unbounded(rate: Decimal) -> Result<Self> {
        Self::create(StepLimit::Unbounded, rate)
    }

    /// The step's upper usage boundary.
    #[must_use]
    pub const fn upper_limit(&self) -> StepLimit {
        self.upper_limit
    }

    /// Price per unit within this step.
    #[must_use]
    pub const fn rate(&self) -> Decimal {
        self.rate
    }
}

#[derive(Deserialize)]
struct RawStep {
    upper_limit: StepLimit,
    rate: Decimal,
}

impl TryFrom<RawStep> for TariffStep {
    type Error = BillingError;

    fn try_from(raw: RawStep) -> Result<Self> {
        Self::create(raw.upper_limit, raw.rate)
    }
}

fn checked_rate(name: &'static str, rate: Decimal) -> Result<Decimal> {
    let rate = round_quantity(rate);
    if rate < Decimal::ZERO {
        return Err(BillingError::invalid(
            name,
            format!("{rate} must not be negative"),
        ));
    }
    Ok(rate)
}

/// A validated pricing schedule.
///
/// Steps are held in ascending order of upper limit regardless of the order
/// they were supplied in. The sequence is never empty and always ends with an
/// unbounded step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<TariffStep>", into = "Vec<TariffStep>")]
pub struct Tariff {
    steps: Vec<TariffStep>,
}

impl Tariff {
    /// Build a tariff from arbitrary steps.
    ///
    /// # Errors
    ///
    /// Returns `StructuralViolation` if there are no steps, if two steps share
    /// an upper limit, or if the highest step is not unbounded.
    pub fn create(steps: impl IntoIterator<Item = TariffStep>) -> Result<Self> {
        let mut steps: Vec<TariffStep> = steps.into_iter().collect();
        steps.sort_by_key(TariffStep::upper_limit);

        for pair in steps.windows(2) {
            if pair[0].upper_limit == pair[1].upper_limit {
                let err = match pair[0].upper_limit {
                    StepLimit::Bounded(limit) => TariffError::DuplicateLimit(limit),
                    StepLimit::Unbounded => TariffError::DuplicateUnbounded,
                };
                return Err(err.into());
            }
        }

        match steps.last() {
            None => Err(TariffError::Empty.into()),
            Some(top) if !top.upper_limit.is_unbounded() => {
                Err(TariffError::MissingUnboundedStep.into())
            }
            Some(_) => Ok(Self { steps }),
        }
    }

    /// A single-step tariff charging `rate` for every unit.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the rate is negative.
    pub fn create_flat_rate(rate: Decimal) -> Result<Self> {
        Ok(Self {
            steps: vec![TariffStep::unbounded(rate)?],
        })
    }

    /// The three-tier municipal schedule: up to 6 units at `tier_one_rate`,
    /// up to 15 at `tier_two_rate`, everything above at `tier_three_rate`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if any rate is negative.
    pub fn create_tiered(
        tier_one_rate: Decimal,
        tier_two_rate: Decimal,
        tier_three_rate: Decimal,
    ) -> Result<Self> {
        let steps = vec![
            TariffStep {
                upper_limit: StepLimit::Bounded(TIER_ONE_LIMIT),
                rate: checked_rate("tier_one_rate", tier_one_rate)?,
            },
            TariffStep {
                upper_limit: StepLimit::Bounded(TIER_TWO_LIMIT),
                rate: checked_rate("tier_two_rate", tier_two_rate)?,
            },
            TariffStep {
                upper_limit: StepLimit::Unbounded,
                rate: checked_rate("tier_three_rate", tier_three_rate)?,
            },
        ];
        Ok(Self { steps })
    }

    /// Steps in ascending order of upper limit.
    #[must_use]
    pub fn steps(&self) -> &[TariffStep] {
        &self.steps
    }

    /// Rate of the lowest step.
    #[must_use]
    pub fn first_rate(&self) -> Decimal {
        // non-empty by construction
        self.steps[0].rate
    }

    /// Whether this tariff has a single unbounded step.
    #[must_use]
    pub fn is_flat(&self) -> bool {
        self.steps.len() == 1
    }
}

impl TryFrom<Vec<TariffStep>> for Tariff {
    type Error = BillingError;

    fn try_from(steps: Vec<TariffStep>) -> Result<Self> {
        Self::create(steps)
    }
}

impl From<Tariff> for Vec<TariffStep> {
    fn from(tariff: Tariff) -> Self {
        tariff.steps
    }
}
