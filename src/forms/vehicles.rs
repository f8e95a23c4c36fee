use serde_json::Value;
use thiserror::Error;
use validator::Validate;

use crate::domain::Record;
use crate::domain::vehicle::{VehicleDraft, sanitize_slug};
use crate::forms::{FieldErrors, LooseNumber, loose_flag, loose_text, positive_id};

/// Name applied by `create_vehicle` when none is given.
pub const DEFAULT_VEHICLE_NAME: &str = "New Vehicle";
/// Type applied by `create_vehicle` when none is given.
pub const DEFAULT_VEHICLE_TYPE: &str = "car";

const TEXT_MAX_LEN: u64 = 255;

/// Errors that can occur while processing a vehicle payload.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VehicleFormError {
    #[error("{0}")]
    Invalid(FieldErrors),
}

/// Whether missing values are defaulted (create) or rejected (update).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehicleFormMode {
    Create,
    Update,
}

#[derive(Debug, Validate)]
struct VehicleText<'a> {
    #[validate(length(max = TEXT_MAX_LEN, message = "Name must be at most 255 characters."))]
    name: &'a str,
    #[validate(length(max = TEXT_MAX_LEN, message = "Type must be at most 255 characters."))]
    vehicle_type: &'a str,
    #[validate(length(max = TEXT_MAX_LEN, message = "Slug must be at most 255 characters."))]
    slug: &'a str,
}

/// The `vehicle` object of an `update_vehicle` / `create_vehicle` request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VehicleForm {
    fields: Record,
}

impl VehicleForm {
    pub fn new(fields: Record) -> Self {
        Self { fields }
    }

    /// Builds the form from an optional JSON value; non-objects read as empty.
    pub fn from_value(value: Option<&Value>) -> Self {
        Self::new(value.and_then(Value::as_object).cloned().unwrap_or_default())
    }

    fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Positive `id`, used by the update action.
    pub fn id(&self) -> Option<i64> {
        positive_id(self.get("id"))
    }

    /// Validates every field, reporting all failures at once.
    pub fn into_draft(self, mode: VehicleFormMode) -> Result<VehicleDraft, VehicleFormError> {
        let creating = mode == VehicleFormMode::Create;
        let mut errors = FieldErrors::new();

        let mut name = loose_text(self.get("name"));
        let mut vehicle_type = loose_text(self.get("type"));
        let mut slug = loose_text(self.get("slug"));
        if creating && name.is_empty() {
            name = DEFAULT_VEHICLE_NAME.to_string();
        }
        if creating && vehicle_type.is_empty() {
            vehicle_type = DEFAULT_VEHICLE_TYPE.to_string();
        }
        if creating && slug.is_empty() {
            slug = name.clone();
        }

        if name.is_empty() {
            errors.push("Name is required.");
        }
        if vehicle_type.is_empty() {
            errors.push("Type is required.");
        }
        let slug = sanitize_slug(&slug);
        if slug.is_empty() {
            errors.push("Slug is required.");
        }

        let defaulted = |key: &str, default: f64| {
            let number = LooseNumber::parse(self.get(key));
            if creating { number.or(default) } else { number }
        };

        let base_price_usd =
            defaulted("base_price_USD", 0.0).required(&mut errors, "Base price must be numeric.");
        let base_price_xcd = LooseNumber::parse(self.get("base_price_XCD"))
            .optional(&mut errors, "Base price (XCD) must be numeric.");
        let insurance =
            defaulted("insurance", 0.0).required(&mut errors, "Insurance must be numeric.");
        let people = defaulted("people", 4.0).required(&mut errors, "Seats must be numeric.");
        let bags = defaulted("bags", 0.0).required(&mut errors, "Bags must be numeric.");
        let doors = defaulted("doors", 4.0).required(&mut errors, "Doors must be numeric.");
        let landing_order = LooseNumber::parse(self.get("landing_order"))
            .optional(&mut errors, "Landing order must be numeric.");

        let text = VehicleText {
            name: &name,
            vehicle_type: &vehicle_type,
            slug: &slug,
        };
        if let Err(validation) = text.validate() {
            errors.extend_validation(&validation);
        }

        let draft = VehicleDraft {
            manual: loose_flag(self.get("manual"), false),
            ac: loose_flag(self.get("ac"), false),
            four_wd: loose_flag(self.get("4wd"), false),
            showing: loose_flag(self.get("showing"), true),
            name,
            vehicle_type,
            slug,
            base_price_usd,
            base_price_xcd,
            insurance,
            people: people.trunc() as i64,
            bags: bags.trunc() as i64,
            doors: doors.trunc() as i64,
            landing_order: landing_order.map(|order| order.trunc() as i64),
        };

        errors.finish(draft).map_err(VehicleFormError::Invalid)
    }
}
