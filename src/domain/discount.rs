use serde::Serialize;

use crate::domain::Record;
use crate::domain::capability::{Capabilities, LogicalField};
use crate::domain::value::{Assignment, FieldValue, value_as_f64, value_as_i64};

/// Day count written when the `days` column exists and none was supplied.
pub const DEFAULT_DISCOUNT_DAYS: i64 = 1;

/// Logical columns of the `vehicle_discounts` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DiscountField {
    Id,
    VehicleId,
    PriceUsd,
    PriceXcd,
    Days,
}

impl LogicalField for DiscountField {
    const TABLE: &'static str = "vehicle_discounts";
    const ALL: &'static [Self] = &[
        Self::Id,
        Self::VehicleId,
        Self::PriceUsd,
        Self::PriceXcd,
        Self::Days,
    ];

    fn candidates(self) -> &'static [&'static str] {
        match self {
            Self::Id => &["id"],
            Self::VehicleId => &["vehicle_id", "vehicle"],
            Self::PriceUsd => &["price_USD"],
            Self::PriceXcd => &["price_XCD"],
            Self::Days => &["days"],
        }
    }
}

impl Capabilities<DiscountField> {
    /// Discounts are writable only with a vehicle column and at least one price column.
    pub fn supports_discounts(&self) -> bool {
        self.table_exists()
            && self.supports(DiscountField::VehicleId)
            && (self.supports(DiscountField::PriceUsd) || self.supports(DiscountField::PriceXcd))
    }
}

/// Validated discount values submitted for a vehicle.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DiscountInput {
    pub price_usd: Option<f64>,
    pub price_xcd: Option<f64>,
    pub days: Option<i64>,
}

impl DiscountInput {
    /// A discount exists only while at least one price is present.
    pub fn has_price(&self) -> bool {
        self.price_usd.is_some() || self.price_xcd.is_some()
    }

    fn price_values(&self) -> [(DiscountField, FieldValue); 3] {
        [
            (DiscountField::PriceUsd, FieldValue::Real(self.price_usd)),
            (DiscountField::PriceXcd, FieldValue::Real(self.price_xcd)),
            (
                DiscountField::Days,
                FieldValue::integer(self.days.unwrap_or(DEFAULT_DISCOUNT_DAYS)),
            ),
        ]
    }
}

/// Row selected by an in-place discount update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscountTarget {
    /// Primary key of the most recent row.
    Id(i64),
    /// Every row of the vehicle, used when the table has no id column.
    Vehicle(i64),
}

/// Outcome of the delete / insert / update decision for one vehicle.
#[derive(Debug, Clone, PartialEq)]
pub enum DiscountPlan {
    Remove,
    Insert(Vec<Assignment>),
    Update {
        target: DiscountTarget,
        assignments: Vec<Assignment>,
    },
}

impl DiscountPlan {
    /// Decide what to do with the vehicle's discount given the current row.
    ///
    /// `existing` must be the most recent row for the vehicle, if any.
    pub fn decide(
        caps: &Capabilities<DiscountField>,
        vehicle_id: i64,
        input: &DiscountInput,
        existing: Option<&Record>,
    ) -> Self {
        if !input.has_price() {
            return Self::Remove;
        }

        match existing {
            None => {
                let vehicle = (DiscountField::VehicleId, FieldValue::integer(vehicle_id));
                let values = std::iter::once(vehicle).chain(input.price_values());
                Self::Insert(caps.assignments(values))
            }
            Some(row) => {
                let target = match caps.column(DiscountField::Id) {
                    Some(id_column) => DiscountTarget::Id(
                        row.get(id_column).and_then(value_as_i64).unwrap_or_default(),
                    ),
                    None => DiscountTarget::Vehicle(vehicle_id),
                };
                Self::Update {
                    target,
                    assignments: caps.assignments(input.price_values()),
                }
            }
        }
    }
}

/// Normalized discount returned to callers regardless of the physical schema.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq)]
pub struct DiscountProjection {
    #[serde(rename = "price_USD")]
    pub price_usd: Option<f64>,
    #[serde(rename = "price_XCD")]
    pub price_xcd: Option<f64>,
    pub days: Option<i64>,
}

impl DiscountProjection {
    pub fn from_record(caps: &Capabilities<DiscountField>, row: &Record) -> Self {
        let read = |field: DiscountField| caps.column(field).and_then(|column| row.get(column));

        Self {
            price_usd: read(DiscountField::PriceUsd).and_then(value_as_f64),
            price_xcd: read(DiscountField::PriceXcd).and_then(value_as_f64),
            days: read(DiscountField::Days).and_then(value_as_i64),
        }
    }
}
