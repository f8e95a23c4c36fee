use serde::Serialize;
use serde_json::Value;

use crate::domain::Record;
use crate::domain::capability::{Capabilities, LogicalField};
use crate::domain::value::{FieldValue, value_as_comparable, value_as_i64};
use crate::domain::vehicle::VehicleField;

/// Status assigned when none (or a blank one) is submitted.
pub const DEFAULT_ORDER_STATUS: &str = "pending";

/// Statuses that set the legacy `confirmed` flag.
const CONFIRMED_STATUSES: [&str; 2] = ["confirmed", "completed"];

/// Placeholder rendered for empty values in change summaries.
pub const EMPTY_DISPLAY: &str = "—";

/// Logical columns of the `order_requests` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum OrderField {
    Id,
    CreatedAt,
    PickUp,
    DropOff,
    PickUpLocation,
    DropOffLocation,
    Confirmed,
    SubTotal,
    Days,
    CarId,
    ContactInfoId,
    Status,
}

impl LogicalField for OrderField {
    const TABLE: &'static str = "order_requests";
    const ALL: &'static [Self] = &[
        Self::Id,
        Self::CreatedAt,
        Self::PickUp,
        Self::DropOff,
        Self::PickUpLocation,
        Self::DropOffLocation,
        Self::Confirmed,
        Self::SubTotal,
        Self::Days,
        Self::CarId,
        Self::ContactInfoId,
        Self::Status,
    ];

    fn candidates(self) -> &'static [&'static str] {
        match self {
            Self::Id => &["id"],
            Self::CreatedAt => &["created_at"],
            Self::PickUp => &["pick_up"],
            Self::DropOff => &["drop_off"],
            Self::PickUpLocation => &["pick_up_location"],
            Self::DropOffLocation => &["drop_off_location"],
            Self::Confirmed => &["confirmed"],
            Self::SubTotal => &["sub_total"],
            Self::Days => &["days"],
            Self::CarId => &["car_id"],
            Self::ContactInfoId => &["contact_info_id"],
            Self::Status => &["status"],
        }
    }
}

/// Order fields whose changes are written to the audit trail.
pub const TRACKED_ORDER_FIELDS: &[OrderField] = &[OrderField::Status];

/// Logical columns of the `contact_info` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ContactField {
    Id,
    FirstName,
    LastName,
    DriverLicense,
    Hotel,
    CountryOrRegion,
    Street,
    TownOrCity,
    StateOrCounty,
    Email,
    Phone,
}

impl LogicalField for ContactField {
    const TABLE: &'static str = "contact_info";
    const ALL: &'static [Self] = &[
        Self::Id,
        Self::FirstName,
        Self::LastName,
        Self::DriverLicense,
        Self::Hotel,
        Self::CountryOrRegion,
        Self::Street,
        Self::TownOrCity,
        Self::StateOrCounty,
        Self::Email,
        Self::Phone,
    ];

    fn candidates(self) -> &'static [&'static str] {
        match self {
            Self::Id => &["id"],
            Self::FirstName => &["first_name"],
            Self::LastName => &["last_name"],
            Self::DriverLicense => &["driver_license"],
            Self::Hotel => &["hotel"],
            Self::CountryOrRegion => &["country_or_region"],
            Self::Street => &["street"],
            Self::TownOrCity => &["town_or_city"],
            Self::StateOrCounty => &["state_or_county"],
            Self::Email => &["email"],
            Self::Phone => &["phone"],
        }
    }
}

/// Live shapes of the three tables joined by the order refresh query.
#[derive(Debug, Clone)]
pub struct OrderView {
    pub order: Capabilities<OrderField>,
    pub vehicle: Capabilities<VehicleField>,
    pub contact: Capabilities<ContactField>,
}

impl OrderView {
    /// Vehicles are joined only when both sides of `v.id = o.car_id` exist.
    pub fn joins_vehicle(&self) -> bool {
        self.order.supports(OrderField::CarId) && self.vehicle.supports(VehicleField::Id)
    }

    /// Contacts are joined only when both sides of `c.id = o.contact_info_id` exist.
    pub fn joins_contact(&self) -> bool {
        self.order.supports(OrderField::ContactInfoId) && self.contact.supports(ContactField::Id)
    }
}

/// Status change requested for an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub status: String,
}

impl StatusUpdate {
    /// Trims the submitted status, falling back to [`DEFAULT_ORDER_STATUS`].
    pub fn new(status: Option<&str>) -> Self {
        let status = status.map(str::trim).unwrap_or_default();
        let status = if status.is_empty() {
            DEFAULT_ORDER_STATUS
        } else {
            status
        };
        Self {
            status: status.to_string(),
        }
    }

    /// Value of the legacy `confirmed` flag for this status.
    pub fn confirmed(&self) -> bool {
        let normalized = self.status.to_lowercase();
        CONFIRMED_STATUSES.contains(&normalized.as_str())
    }

    /// Logical values written for the update, before column filtering.
    pub fn values(&self) -> Vec<(OrderField, FieldValue)> {
        vec![
            (OrderField::Status, FieldValue::text(self.status.as_str())),
            (OrderField::Confirmed, FieldValue::flag(self.confirmed())),
        ]
    }

    /// Proposed new value of a tracked field.
    fn tracked_value(&self, field: OrderField) -> Option<Value> {
        match field {
            OrderField::Status => Some(Value::String(self.status.clone())),
            _ => None,
        }
    }
}

/// One tracked field whose stored value differs from the submitted one.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldChange {
    pub field: &'static str,
    pub before: Value,
    pub after: Value,
}

impl FieldChange {
    /// Renders `field: old → new`.
    pub fn summary_line(&self) -> String {
        format!(
            "{}: {} → {}",
            self.field,
            display_value(&self.before),
            display_value(&self.after)
        )
    }
}

/// Compares the stored order against the update, string-wise, over the
/// tracked fields that exist in the table.
pub fn diff_tracked_fields(
    caps: &Capabilities<OrderField>,
    before: &Record,
    update: &StatusUpdate,
) -> Vec<FieldChange> {
    TRACKED_ORDER_FIELDS
        .iter()
        .filter_map(|field| {
            let column = caps.column(*field)?;
            let after = update.tracked_value(*field)?;
            let stored = before.get(column);
            if value_as_comparable(stored) == value_as_comparable(Some(&after)) {
                return None;
            }
            Some(FieldChange {
                field: column,
                before: stored.cloned().unwrap_or(Value::Null),
                after,
            })
        })
        .collect()
}

/// Human-readable rendering of a stored value inside a change summary.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => EMPTY_DISPLAY.to_string(),
        Value::String(text) if text.trim().is_empty() => EMPTY_DISPLAY.to_string(),
        Value::String(text) => text.clone(),
        Value::Bool(flag) => flag.to_string(),
        other => other.to_string(),
    }
}

/// Joins the per-field lines of a change set with newlines.
pub fn render_change_summary(changes: &[FieldChange]) -> String {
    changes
        .iter()
        .map(FieldChange::summary_line)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Adds `customer_name` and a guaranteed `status` to a refreshed order row.
pub fn finalize_order_projection(mut row: Record, has_status_column: bool) -> Record {
    let part = |key: &str| match row.get(key) {
        Some(Value::String(text)) => text.clone(),
        _ => String::new(),
    };
    let customer_name = format!("{} {}", part("first_name"), part("last_name"))
        .trim()
        .to_string();
    row.insert("customer_name".to_string(), Value::String(customer_name));

    if !has_status_column {
        let confirmed = row.get("confirmed").and_then(value_as_i64) == Some(1);
        let status = if confirmed {
            "confirmed"
        } else {
            DEFAULT_ORDER_STATUS
        };
        row.insert("status".to_string(), Value::String(status.to_string()));
    }

    row
}

/// Full before/after state stored with a history entry.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct OrderSnapshot {
    pub order: Record,
    pub contact: Record,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap_or_default()
    }

    fn order_caps() -> Capabilities<OrderField> {
        Capabilities::from_columns(&["id", "status", "confirmed", "contact_info_id"])
    }

    #[test]
    fn status_defaults_to_pending() {
        assert_eq!(StatusUpdate::new(None).status, "pending");
        assert_eq!(StatusUpdate::new(Some("   ")).status, "pending");
        assert_eq!(StatusUpdate::new(Some(" confirmed ")).status, "confirmed");
    }

    #[test]
    fn confirmed_flag_follows_status() {
        assert!(StatusUpdate::new(Some("Confirmed")).confirmed());
        assert!(StatusUpdate::new(Some("completed")).confirmed());
        assert!(!StatusUpdate::new(Some("cancelled")).confirmed());
    }

    #[test]
    fn status_change_renders_one_line() {
        let before = record(json!({"id": 1, "status": "pending"}));
        let update = StatusUpdate::new(Some("confirmed"));

        let changes = diff_tracked_fields(&order_caps(), &before, &update);

        assert_eq!(changes.len(), 1);
        assert_eq!(render_change_summary(&changes), "status: pending → confirmed");
    }

    #[test]
    fn unchanged_status_produces_no_changes() {
        let before = record(json!({"id": 1, "status": "confirmed"}));
        let update = StatusUpdate::new(Some("confirmed"));

        assert!(diff_tracked_fields(&order_caps(), &before, &update).is_empty());
    }

    #[test]
    fn missing_status_column_is_not_tracked() {
        let caps = Capabilities::<OrderField>::from_columns(&["id", "confirmed"]);
        let before = record(json!({"id": 1, "confirmed": 0}));

        let changes = diff_tracked_fields(&caps, &before, &StatusUpdate::new(Some("confirmed")));

        assert!(changes.is_empty());
    }

    #[test]
    fn null_status_renders_placeholder() {
        let before = record(json!({"id": 1, "status": null}));

        let changes = diff_tracked_fields(&order_caps(), &before, &StatusUpdate::new(None));

        assert_eq!(render_change_summary(&changes), "status: — → pending");
    }

    #[test]
    fn display_value_formats_scalars() {
        assert_eq!(display_value(&Value::Null), "—");
        assert_eq!(display_value(&json!("  ")), "—");
        assert_eq!(display_value(&json!(true)), "true");
        assert_eq!(display_value(&json!(false)), "false");
        assert_eq!(display_value(&json!(42)), "42");
        assert_eq!(display_value(&json!("late")), "late");
    }

    #[test]
    fn projection_derives_customer_and_status() {
        let row = record(json!({
            "id": 3,
            "confirmed": 1,
            "first_name": " Ada",
            "last_name": null,
        }));

        let finalized = finalize_order_projection(row, false);

        assert_eq!(finalized.get("customer_name"), Some(&json!("Ada")));
        assert_eq!(finalized.get("status"), Some(&json!("confirmed")));
    }

    #[test]
    fn projection_keeps_status_column() {
        let row = record(json!({"id": 3, "confirmed": 1, "status": "cancelled"}));

        let finalized = finalize_order_projection(row, true);

        assert_eq!(finalized.get("status"), Some(&json!("cancelled")));
        assert_eq!(finalized.get("customer_name"), Some(&json!("")));
    }
}
