//! The bill aggregate.
//!
//! A [`Bill`] fixes one property's readings and tariffs for a billing period
//! and stores the costs computed from them at creation time. It is only ever
//! produced fully validated and fully computed.

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculator::{add_money, flat_cost, tiered_cost, vat_on};
use crate::error::{BillingError, Result};
use crate::ids::{BillId, PropertyId};
use crate::reading::MeterReading;
use crate::tariff::Tariff;

/// The utilities a bill charges for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Utility {
    /// Billed at a flat rate.
    Electricity,
    /// Billed on the tiered schedule.
    Water,
    /// Billed on the tiered schedule.
    Sanitation,
}

impl Utility {
    /// All utilities in bill order.
    pub const ALL: [Self; 3] = [Self::Electricity, Self::Water, Self::Sanitation];

    /// Get the utility name as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Electricity => "electricity",
            Self::Water => "water",
            Self::Sanitation => "sanitation",
        }
    }
}

/// A reading and the tariff it is billed under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UtilityCharge {
    /// Meter reading for the period.
    pub reading: MeterReading,
    /// Tariff applied to the units used.
    pub tariff: Tariff,
}

impl UtilityCharge {
    /// Pair a reading with its tariff.
    #[must_use]
    pub fn new(reading: MeterReading, tariff: Tariff) -> Self {
        Self { reading, tariff }
    }
}

/// One utility's line on a bill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LineItem {
    /// The utility charged.
    pub utility: Utility,
    /// Units consumed.
    pub units: Decimal,
    /// Cost before VAT.
    pub cost: Decimal,
}

/// A billing-period record for one property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bill {
    id: Option<BillId>,
    invoice_number: String,
    property_id: PropertyId,
    period_start: DateTime<Utc>,
    period_end: DateTime<Utc>,
    electricity: UtilityCharge,
    water: UtilityCharge,
    sanitation: UtilityCharge,
    electricity_cost: Decimal,
    water_cost: Decimal,
    sanitation_cost: Decimal,
    subtotal: Decimal,
    vat_amount: Decimal,
    total: Decimal,
    created_at: DateTime<Utc>,
}

impl Bill {
    /// Create a bill and compute its costs.
    ///
    /// Period bounds may carry any offset; they are stored in UTC. The invoice
    /// number is trimmed.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the invoice number is blank, the property
    /// id is nil, the period ends before it starts, or a cost does not fit in
    /// a `Decimal`.
    #[allow(clippy::too_many_arguments)]
    pub fn create<S: TimeZone, E: TimeZone>(
        invoice_number: &str,
        property_id: PropertyId,
        period_start: DateTime<S>,
        period_end: DateTime<E>,
        electricity_reading: MeterReading,
        water_reading: MeterReading,
        sanitation_reading: MeterReading,
        electricity_tariff: Tariff,
        water_tariff: Tariff,
        sanitation_tariff: Tariff,
    ) -> Result<Self> {
        Self::assemble(
            invoice_number,
            property_id,
            period_start.with_timezone(&Utc),
            period_end.with_timezone(&Utc),
            UtilityCharge::new(electricity_reading, electricity_tariff),
            UtilityCharge::new(water_reading, water_tariff),
            UtilityCharge::new(sanitation_reading, sanitation_tariff),
        )
    }

    /// Start a builder for callers holding optional readings and tariffs.
    #[must_use]
    pub fn builder<S: TimeZone, E: TimeZone>(
        invoice_number: impl Into<String>,
        property_id: PropertyId,
        period_start: DateTime<S>,
        period_end: DateTime<E>,
    ) -> BillBuilder {
        BillBuilder {
            invoice_number: invoice_number.into(),
            property_id,
            period_start: period_start.with_timezone(&Utc),
            period_end: period_end.with_timezone(&Utc),
            readings: [None, None, None],
            tariffs: [None, None, None],
        }
    }

    fn assemble(
        invoice_number: &str,
        property_id: PropertyId,
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
        electricity: UtilityCharge,
        water: UtilityCharge,
        sanitation: UtilityCharge,
    ) -> Result<Self> {
        let invoice_number = invoice_number.trim();
        if invoice_number.is_empty() {
            return Err(BillingError::invalid("invoice_number", "must not be blank"));
        }
        if property_id.is_nil() {
            return Err(BillingError::invalid("property_id", "must not be nil"));
        }
        if period_end < period_start {
            return Err(BillingError::invalid(
                "period_end",
                format!("{period_end} is before period start {period_start}"),
            ));
        }

        let costs = Costs::compute(&electricity, &water, &sanitation)?;
        let mut bill = Self {
            id: None,
            invoice_number: invoice_number.to_string(),
            property_id,
            period_start,
            period_end,
            electricity,
            water,
            sanitation,
            electricity_cost: Decimal::ZERO,
            water_cost: Decimal::ZERO,
            sanitation_cost: Decimal::ZERO,
            subtotal: Decimal::ZERO,
            vat_amount: Decimal::ZERO,
            total: Decimal::ZERO,
            created_at: Utc::now(),
        };
        bill.apply(costs);

        tracing::debug!(
            invoice_number = %bill.invoice_number,
            property_id = %bill.property_id,
            subtotal = %bill.subtotal,
            vat_amount = %bill.vat_amount,
            total = %bill.total,
            "Bill computed"
        );

        Ok(bill)
    }

    /// Re-run the cost pipeline against the stored readings and tariffs.
    ///
    /// The bill is left unchanged on error.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if a cost does not fit in a `Decimal`.
    pub fn recalculate(&mut self) -> Result<()> {
        let costs = Costs::compute(&self.electricity, &self.water, &self.sanitation)?;
        self.apply(costs);
        Ok(())
    }

    fn apply(&mut self, costs: Costs) {
        self.electricity_cost = costs.electricity;
        self.water_cost = costs.water;
        self.sanitation_cost = costs.sanitation;
        self.subtotal = costs.subtotal;
        self.vat_amount = costs.vat_amount;
        self.total = costs.total;
    }

    /// Attach the identifier allocated by the persistence layer.
    #[must_use]
    pub fn with_id(mut self, id: BillId) -> Self {
        self.id = Some(id);
        self
    }

    /// The persisted identifier, once assigned.
    #[must_use]
    pub const fn id(&self) -> Option<BillId> {
        self.id
    }

    /// The trimmed invoice number.
    #[must_use]
    pub fn invoice_number(&self) -> &str {
        &self.invoice_number
    }

    /// The billed property.
    #[must_use]
    pub const fn property_id(&self) -> PropertyId {
        self.property_id
    }

    /// Start of the billing period (UTC).
    #[must_use]
    pub const fn period_start(&self) -> DateTime<Utc> {
        self.period_start
    }

    /// End of the billing period (UTC).
    #[must_use]
    pub const fn period_end(&self) -> DateTime<Utc> {
        self.period_end
    }

    /// The reading and tariff billed for `utility`.
    #[must_use]
    pub const fn charge(&self, utility: Utility) -> &UtilityCharge {
        match utility {
            Utility::Electricity => &self.electricity,
            Utility::Water => &self.water,
            Utility::Sanitation => &self.sanitation,
        }
    }

    /// The pre-VAT cost for `utility`.
    #[must_use]
    pub const fn cost(&self, utility: Utility) -> Decimal {
        match utility {
            Utility::Electricity => self.electricity_cost,
            Utility::Water => self.water_cost,
            Utility::Sanitation => self.sanitation_cost,
        }
    }

    /// Electricity cost.
    #[must_use]
    pub const fn electricity_cost(&self) -> Decimal {
        self.electricity_cost
    }

    /// Water cost.
    #[must_use]
    pub const fn water_cost(&self) -> Decimal {
        self.water_cost
    }

    /// Sanitation cost.
    #[must_use]
    pub const fn sanitation_cost(&self) -> Decimal {
        self.sanitation_cost
    }

    /// Sum of the three utility costs.
    #[must_use]
    pub const fn subtotal(&self) -> Decimal {
        self.subtotal
    }

    /// VAT on the subtotal.
    #[must_use]
    pub const fn vat_amount(&self) -> Decimal {
        self.vat_amount
    }

    /// Subtotal plus VAT.
    #[must_use]
    pub const fn total(&self) -> Decimal {
        self.total
    }

    /// When the bill was created (UTC).
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// One line per utility, in bill order.
    #[must_use]
    pub fn line_items(&self) -> [LineItem; 3] {
        Utility::ALL.map(|utility| LineItem {
            utility,
            units: self.charge(utility).reading.units_used(),
            cost: self.cost(utility),
        })
    }
}

struct Costs {
    electricity: Decimal,
    water: Decimal,
    sanitation: Decimal,
    subtotal: Decimal,
    vat_amount: Decimal,
    total: Decimal,
}

impl Costs {
    fn compute(
        electricity: &UtilityCharge,
        water: &UtilityCharge,
        sanitation: &UtilityCharge,
    ) -> Result<Self> {
        let electricity = flat_cost(electricity.reading.units_used(), &electricity.tariff)?;
        let water = tiered_cost(water.reading.units_used(), &water.tariff)?;
        let sanitation = tiered_cost(sanitation.reading.units_used(), &sanitation.tariff)?;
        let subtotal = add_money("subtotal", electricity, water)
            .and_then(|sum| add_money("subtotal", sum, sanitation))?;
        let vat_amount = vat_on(subtotal)?;
        let total = add_money("subtotal", subtotal, vat_amount)?;
        Ok(Self {
            electricity,
            water,
            sanitation,
            subtotal,
            vat_amount,
            total,
        })
    }
}

/// Collects a bill's inputs when some may be absent.
///
/// [`BillBuilder::build`] reports the first missing reading or tariff as
/// `MissingReference` before any other validation runs.
#[derive(Debug, Clone)]
pub struct BillBuilder {
    invoice_number: String,
    property_id: PropertyId,
    period_start: DateTime<Utc>,
    period_end: DateTime<Utc>,
    readings: [Option<MeterReading>; 3],
    tariffs: [Option<Tariff>; 3],
}

impl BillBuilder {
    /// Set the meter reading for `utility`.
    #[must_use]
    pub fn reading(mut self, utility: Utility, reading: MeterReading) -> Self {
        self.readings[slot(utility)] = Some(reading);
        self
    }

    /// Set the tariff for `utility`.
    #[must_use]
    pub fn tariff(mut self, utility: Utility, tariff: Tariff) -> Self {
        self.tariffs[slot(utility)] = Some(tariff);
        self
    }

    /// Set both the reading and the tariff for `utility`.
    #[must_use]
    pub fn charge(self, utility: Utility, reading: MeterReading, tariff: Tariff) -> Self {
        self.reading(utility, reading).tariff(utility, tariff)
    }

    /// Validate and compute the bill.
    ///
    /// # Errors
    ///
    /// Returns `MissingReference` if any reading or tariff was not set, then
    /// anything [`Bill::create`] can return.
    pub fn build(self) -> Result<Bill> {
        let [electricity_reading, water_reading, sanitation_reading] = self.readings;
        let [electricity_tariff, water_tariff, sanitation_tariff] = self.tariffs;

        let electricity_reading =
            electricity_reading.ok_or(BillingError::MissingReference("electricity reading"))?;
        let water_reading = water_reading.ok_or(BillingError::MissingReference("water reading"))?;
        let sanitation_reading =
            sanitation_reading.ok_or(BillingError::MissingReference("sanitation reading"))?;
        let electricity_tariff =
            electricity_tariff.ok_or(BillingError::MissingReference("electricity tariff"))?;
        let water_tariff = water_tariff.ok_or(BillingError::MissingReference("water tariff"))?;
        let sanitation_tariff =
            sanitation_tariff.ok_or(BillingError::MissingReference("sanitation tariff"))?;

        Bill::assemble(
            &self.invoice_number,
            self.property_id,
            self.period_start,
            self.period_end,
            UtilityCharge::new(electricity_reading, electricity_tariff),
            UtilityCharge::new(water_reading, water_tariff),
            UtilityCharge::new(sanitation_reading, sanitation_tariff),
        )
    }
}

const fn slot(utility: Utility) -> usize {
    match utility {
        Utility::Electricity => 0,
        Utility::Water => 1,
        Utility::Sanitation => 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset};
    use rust_decimal_macros::dec;

    fn reading(opening: Decimal, closing: Decimal) -> MeterReading {
        MeterReading::create(opening, closing).unwrap()
    }

    fn flat() -> Tariff {
        Tariff::create_flat_rate(dec!(1)).unwrap()
    }

    fn period() -> (DateTime<Utc>, DateTime<Utc>) {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        (start, start + Duration::days(30))
    }

    fn sample_bill() -> Bill {
        let (start, end) = period();
        Bill::create(
            "  INV-0001 ",
            PropertyId::generate(),
            start,
            end,
            reading(dec!(1000), dec!(1130)),
            reading(dec!(50), dec!(58)),
            reading(dec!(50), dec!(58)),
            Tariff::create_flat_rate(dec!(3.40)).unwrap(),
            Tariff::create_tiered(dec!(20.80), dec!(34.20), dec!(48.50)).unwrap(),
            Tariff::create_tiered(dec!(25.50), dec!(20.50), dec!(29.80)).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn create_computes_all_costs() {
        let bill = sample_bill();
        assert_eq!(bill.electricity_cost(), dec!(442.00));
        assert_eq!(bill.water_cost(), dec!(193.20));
        assert_eq!(bill.sanitation_cost(), dec!(194.00));
        assert_eq!(bill.subtotal(), dec!(829.20));
        assert_eq!(bill.vat_amount(), dec!(124.38));
        assert_eq!(bill.total(), dec!(953.58));
    }

    #[test]
    fn create_trims_invoice_number() {
        assert_eq!(sample_bill().invoice_number(), "INV-0001");
    }

    #[test]
    fn create_sets_created_at_now() {
        let before = Utc::now();
        let bill = sample_bill();
        let after = Utc::now();
        assert!(bill.created_at() >= before && bill.created_at() <= after);
        assert!(bill.id().is_none());
    }

    #[test]
    fn blank_invoice_number_rejected() {
        let (start, end) = period();
        let err = Bill::builder("   ", PropertyId::generate(), start, end)
            .charge(Utility::Electricity, reading(dec!(0), dec!(1)), flat())
            .charge(Utility::Water, reading(dec!(0), dec!(1)), flat())
            .charge(Utility::Sanitation, reading(dec!(0), dec!(1)), flat())
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            BillingError::InvalidArgument {
                name: "invoice_number",
                ..
            }
        ));
    }

    #[test]
    fn nil_property_rejected() {
        let (start, end) = period();
        let flat = Tariff::create_flat_rate(dec!(1)).unwrap();
        let r = reading(dec!(0), dec!(1));
        let err = Bill::create(
            "INV-0002",
            PropertyId::nil(),
            start,
            end,
            r,
            r,
            r,
            flat.clone(),
            flat.clone(),
            flat,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            BillingError::InvalidArgument {
                name: "property_id",
                ..
            }
        ));
    }

    #[test]
    fn reversed_period_rejected() {
        let (start, end) = period();
        let flat = Tariff::create_flat_rate(dec!(1)).unwrap();
        let r = reading(dec!(0), dec!(1));
        let err = Bill::create(
            "INV-0003",
            PropertyId::generate(),
            end,
            start,
            r,
            r,
            r,
            flat.clone(),
            flat.clone(),
            flat,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            BillingError::InvalidArgument {
                name: "period_end",
                ..
            }
        ));
    }

    #[test]
    fn single_instant_period_allowed() {
        let (start, _) = period();
        let flat = Tariff::create_flat_rate(dec!(1)).unwrap();
        let r = reading(dec!(0), dec!(1));
        let bill = Bill::create(
            "INV-0004",
            PropertyId::generate(),
            start,
            start,
            r,
            r,
            r,
            flat.clone(),
            flat.clone(),
            flat,
        )
        .unwrap();
        assert_eq!(bill.period_start(), bill.period_end());
    }

    #[test]
    fn period_is_normalised_to_utc() {
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        let start = plus_two.with_ymd_and_hms(2024, 3, 1, 2, 0, 0).unwrap();
        let end = plus_two.with_ymd_and_hms(2024, 3, 31, 2, 0, 0).unwrap();
        let flat = Tariff::create_flat_rate(dec!(1)).unwrap();
        let r = reading(dec!(0), dec!(1));
        let bill = Bill::create(
            "INV-0005",
            PropertyId::generate(),
            start,
            end,
            r,
            r,
            r,
            flat.clone(),
            flat.clone(),
            flat,
        )
        .unwrap();
        assert_eq!(
            bill.period_start(),
            Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn builder_reports_missing_reference() {
        let (start, end) = period();
        let err = Bill::builder("INV-0006", PropertyId::generate(), start, end)
            .charge(Utility::Electricity, reading(dec!(0), dec!(1)), flat())
            .reading(Utility::Water, reading(dec!(0), dec!(1)))
            .charge(Utility::Sanitation, reading(dec!(0), dec!(1)), flat())
            .build()
            .unwrap_err();
        assert_eq!(err, BillingError::MissingReference("water tariff"));
    }

    #[test]
    fn missing_reference_checked_before_arguments() {
        let (start, end) = period();
        let err = Bill::builder("", PropertyId::nil(), end, start)
            .build()
            .unwrap_err();
        assert_eq!(err, BillingError::MissingReference("electricity reading"));
    }

    #[test]
    fn recalculate_is_idempotent() {
        let mut bill = sample_bill();
        let snapshot = bill.clone();
        bill.recalculate().unwrap();
        bill.recalculate().unwrap();
        assert_eq!(bill, snapshot);
    }

    #[test]
    fn oversized_usage_is_rejected_not_computed() {
        let (start, end) = period();
        let huge = reading(dec!(0), dec!(10000000000000000000000000000));
        let err = Bill::create(
            "INV-0008",
            PropertyId::generate(),
            start,
            end,
            huge,
            reading(dec!(0), dec!(1)),
            reading(dec!(0), dec!(1)),
            Tariff::create_flat_rate(dec!(10)).unwrap(),
            flat(),
            flat(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            BillingError::invalid("units", "cost exceeds representable range")
        );
    }

    #[test]
    fn oversized_subtotal_is_rejected() {
        let (start, end) = period();
        // Each cost fits on its own; their sum does not.
        let large = reading(dec!(0), dec!(30000000000000000000000000000));
        let err = Bill::builder("INV-0009", PropertyId::generate(), start, end)
            .charge(Utility::Electricity, large, flat())
            .charge(Utility::Water, large, flat())
            .charge(Utility::Sanitation, large, flat())
            .build()
            .unwrap_err();
        assert!(matches!(err, BillingError::InvalidArgument { name: "subtotal", .. }));
    }

    #[test]
    fn line_items_follow_bill_order() {
        let items = sample_bill().line_items();
        assert_eq!(items[0].utility, Utility::Electricity);
        assert_eq!(items[0].units, dec!(130));
        assert_eq!(items[1].cost, dec!(193.20));
        assert_eq!(items[2].utility, Utility::Sanitation);
        let sum: Decimal = items.iter().map(|i| i.cost).sum();
        assert_eq!(sum, sample_bill().subtotal());
    }

    #[test]
    fn with_id_assigns_identifier() {
        let id = BillId::generate();
        assert_eq!(sample_bill().with_id(id).id(), Some(id));
    }

    #[test]
    fn serializes_costs_as_decimal_strings() {
        let json = serde_json::to_value(sample_bill()).unwrap();
        assert_eq!(json["total"], "953.58");
        assert_eq!(json["invoice_number"], "INV-0001");
        assert_eq!(json["water"]["tariff"][0]["upper_limit"], "6");
    }
}
