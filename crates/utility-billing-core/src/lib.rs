//! Tariff and billing-calculation core for utility bills.
//!
//! This crate provides the pure computation layer behind a utility bill:
//!
//! - **Identifiers**: `PropertyId`, `BillId`
//! - **Readings**: `MeterReading`
//! - **Tariffs**: `Tariff`, `TariffStep`, `StepLimit`
//! - **Calculation**: flat-rate, tiered and VAT functions in [`calculator`]
//! - **Bills**: `Bill`, `BillBuilder`, `Utility`, `UtilityCharge`
//!
//! # Money
//!
//! All amounts are `rust_decimal::Decimal`. Readings and rates are kept at
//! 4 fractional digits, computed costs at 2, both rounded midpoint away from
//! zero. VAT is a fixed 15%.
//!
//! Nothing here performs I/O or holds shared state; every operation is
//! synchronous and deterministic apart from `Bill::created_at`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod bill;
pub mod calculator;
pub mod error;
pub mod ids;
pub mod money;
pub mod reading;
pub mod tariff;

pub use bill::{Bill, BillBuilder, LineItem, Utility, UtilityCharge};
pub use calculator::{
    calculate_electricity_cost, calculate_tiered_cost, calculate_total_with_vat, calculate_vat,
    tier_breakdown, TierLine,
};
pub use error::{BillingError, ErrorKind, Result, TariffError};
pub use ids::{BillId, IdError, PropertyId};
pub use money::{round_money, round_quantity, MONEY_SCALE, QUANTITY_SCALE, VAT_RATE};
pub use reading::MeterReading;
pub use tariff::{StepLimit, Tariff, TariffStep, TIER_ONE_LIMIT, TIER_TWO_LIMIT};
