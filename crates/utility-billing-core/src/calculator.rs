//! Cost calculation.
//!
//! Stateless functions turning consumed units and a [`Tariff`] into money.
//! Results are rounded to the stored money precision; intermediate sums keep
//! full `Decimal` precision.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::{BillingError, Result};
use crate::money::{round_money, VAT_RATE};
use crate::tariff::{Tariff, TariffStep};

/// Units billed within one tariff step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TierLine {
    /// The step these units fell into.
    pub step: TariffStep,
    /// Units billed in this step.
    pub units: Decimal,
    /// `units * step.rate`, unrounded.
    pub cost: Decimal,
}

/// Flat-rate cost: every unit at the tariff's first rate.
///
/// Additional steps are ignored; use [`calculate_tiered_cost`] for
/// progressive pricing.
///
/// # Errors
///
/// Returns `InvalidArgument` if `units` is negative or the cost does not fit
/// in a `Decimal`.
pub fn calculate_electricity_cost(units: Decimal, tariff: &Tariff) -> Result<Decimal> {
    check_units(units)?;
    flat_cost(units, tariff)
}

/// Progressive cost: units fill each step in ascending order, each step billed
/// at its own rate.
///
/// # Errors
///
/// Returns `InvalidArgument` if `units` is negative or the cost does not fit
/// in a `Decimal`.
pub fn calculate_tiered_cost(units: Decimal, tariff: &Tariff) -> Result<Decimal> {
    check_units(units)?;
    tiered_cost(units, tariff)
}

/// The per-step split behind [`calculate_tiered_cost`].
///
/// Only steps that received usage are returned, so zero usage yields an empty
/// list.
///
/// # Errors
///
/// Returns `InvalidArgument` if `units` is negative or a step's cost does not
/// fit in a `Decimal`.
pub fn tier_breakdown(units: Decimal, tariff: &Tariff) -> Result<Vec<TierLine>> {
    check_units(units)?;
    tier_lines(units, tariff)
}

/// VAT due on `amount`, rounded to money precision.
///
/// # Errors
///
/// Returns `InvalidArgument` if `amount` is negative.
pub fn calculate_vat(amount: Decimal) -> Result<Decimal> {
    if amount < Decimal::ZERO {
        return Err(BillingError::invalid(
            "amount",
            format!("{amount} must not be negative"),
        ));
    }
    vat_on(amount)
}

/// `subtotal` plus its VAT.
///
/// # Errors
///
/// Returns `InvalidArgument` if `subtotal` is negative or the total does not
/// fit in a `Decimal`.
pub fn calculate_total_with_vat(subtotal: Decimal) -> Result<Decimal> {
    add_money("subtotal", subtotal, calculate_vat(subtotal)?)
}

fn check_units(units: Decimal) -> Result<()> {
    if units < Decimal::ZERO {
        return Err(BillingError::invalid(
            "units",
            format!("{units} must not be negative"),
        ));
    }
    Ok(())
}

fn out_of_range(name: &'static str) -> BillingError {
    BillingError::invalid(name, "cost exceeds representable range")
}

// Variants for callers that already hold non-negative inputs. Only overflow
// can fail here.

pub(crate) fn flat_cost(units: Decimal, tariff: &Tariff) -> Result<Decimal> {
    units
        .checked_mul(tariff.first_rate())
        .map(round_money)
        .ok_or_else(|| out_of_range("units"))
}

pub(crate) fn tiered_cost(units: Decimal, tariff: &Tariff) -> Result<Decimal> {
    let sum = tier_lines(units, tariff)?
        .iter()
        .try_fold(Decimal::ZERO, |acc, line| acc.checked_add(line.cost))
        .ok_or_else(|| out_of_range("units"))?;
    Ok(round_money(sum))
}

pub(crate) fn vat_on(amount: Decimal) -> Result<Decimal> {
    amount
        .checked_mul(VAT_RATE)
        .map(round_money)
        .ok_or_else(|| out_of_range("amount"))
}

pub(crate) fn add_money(name: &'static str, a: Decimal, b: Decimal) -> Result<Decimal> {
    a.checked_add(b).ok_or_else(|| out_of_range(name))
}

fn tier_lines(units: Decimal, tariff: &Tariff) -> Result<Vec<TierLine>> {
    let mut lines = Vec::with_capacity(tariff.steps().len());
    let mut remaining = units;
    let mut previous_limit = Decimal::ZERO;

    for step in tariff.steps() {
        if remaining <= Decimal::ZERO {
            break;
        }

        let in_tier = step
            .upper_limit()
            .capacity_above(previous_limit)
            .map_or(remaining, |capacity| remaining.min(capacity));

        tracing::trace!(
            limit = %step.upper_limit(),
            rate = %step.rate(),
            units = %in_tier,
            "tier walked"
        );

        let cost = in_tier
            .checked_mul(step.rate())
            .ok_or_else(|| out_of_range("units"))?;
        lines.push(TierLine {
            step: *step,
            units: in_tier,
            cost,
        });

        remaining -= in_tier;
        if let Some(limit) = step.upper_limit().as_bounded() {
            previous_limit = limit;
        }
    }

    Ok(lines)
}
