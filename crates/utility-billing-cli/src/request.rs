//! Bill request types.
//!
//! The request carries raw numbers exactly as a caller supplies them; every
//! value is validated by the core's factories when the bill is built.

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utility_billing_core::{
    Bill, BillingError, MeterReading, PropertyId, Result, StepLimit, Tariff, TariffStep, Utility,
};

/// A request to compute one bill.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillRequest {
    /// Pre-allocated invoice number.
    pub invoice_number: String,

    /// Property the bill is issued for (UUID string).
    pub property_id: String,

    /// Start of the billing period (RFC 3339, any offset).
    pub period_start: DateTime<FixedOffset>,

    /// End of the billing period (RFC 3339, any offset).
    pub period_end: DateTime<FixedOffset>,

    /// Electricity reading and tariff.
    #[serde(default)]
    pub electricity: Option<UtilityRequest>,

    /// Water reading and tariff.
    #[serde(default)]
    pub water: Option<UtilityRequest>,

    /// Sanitation reading and tariff.
    #[serde(default)]
    pub sanitation: Option<UtilityRequest>,
}

/// Raw meter values and tariff for one utility.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UtilityRequest {
    /// Opening meter value.
    pub opening: Decimal,

    /// Closing meter value.
    pub closing: Decimal,

    /// Tariff to bill under.
    #[serde(default)]
    pub tariff: Option<TariffRequest>,
}

/// How a tariff is described in a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TariffRequest {
    /// A single rate for every unit.
    Flat(Decimal),

    /// The three-tier municipal schedule.
    Tiered([Decimal; 3]),

    /// Arbitrary steps, in any order.
    Steps(Vec<StepRequest>),
}

/// One raw tariff step; a missing or null limit means unbounded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRequest {
    /// Upper usage limit, or `None` for the top step.
    #[serde(default)]
    pub upper_limit: Option<Decimal>,

    /// Price per unit.
    pub rate: Decimal,
}

impl TariffRequest {
    /// Build the validated tariff.
    ///
    /// # Errors
    ///
    /// Returns whatever the corresponding `Tariff` factory rejects.
    pub fn to_tariff(&self) -> Result<Tariff> {
        match self {
            Self::Flat(rate) => Tariff::create_flat_rate(*rate),
            Self::Tiered([r1, r2, r3]) => Tariff::create_tiered(*r1, *r2, *r3),
            Self::Steps(steps) => {
                let steps = steps
                    .iter()
                    .map(|step| TariffStep::create(StepLimit::from(step.upper_limit), step.rate))
                    .collect::<Result<Vec<_>>>()?;
                Tariff::create(steps)
            }
        }
    }
}

impl BillRequest {
    /// Validate the request and compute the bill.
    ///
    /// Absent utilities or tariffs are reported as missing references before
    /// any reading, tariff or bill field is validated.
    ///
    /// # Errors
    ///
    /// Returns any error raised by the core while building readings, tariffs
    /// or the bill itself.
    pub fn to_bill(&self) -> Result<Bill> {
        let utilities = [
            (Utility::Electricity, self.electricity.as_ref()),
            (Utility::Water, self.water.as_ref()),
            (Utility::Sanitation, self.sanitation.as_ref()),
        ];

        let mut present = Vec::with_capacity(utilities.len());
        for (utility, request) in utilities {
            let request = request.ok_or(BillingError::MissingReference(reading_name(utility)))?;
            present.push((utility, request));
        }
        for (utility, request) in &present {
            if request.tariff.is_none() {
                return Err(BillingError::MissingReference(tariff_name(*utility)));
            }
        }

        let property_id: PropertyId = self.property_id.parse()?;
        let mut builder = Bill::builder(
            self.invoice_number.as_str(),
            property_id,
            self.period_start,
            self.period_end,
        );
        for (utility, request) in present {
            builder = builder.reading(
                utility,
                MeterReading::create(request.opening, request.closing)?,
            );
            if let Some(tariff) = &request.tariff {
                builder = builder.tariff(utility, tariff.to_tariff()?);
            }
        }

        builder.build()
    }
}

const fn reading_name(utility: Utility) -> &'static str {
    match utility {
        Utility::Electricity => "electricity reading",
        Utility::Water => "water reading",
        Utility::Sanitation => "sanitation reading",
    }
}

const fn tariff_name(utility: Utility) -> &'static str {
    match utility {
        Utility::Electricity => "electricity tariff",
        Utility::Water => "water tariff",
        Utility::Sanitation => "sanitation tariff",
    }
}
