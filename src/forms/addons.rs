use serde_json::Value;
use thiserror::Error;

use crate::domain::Record;
use crate::domain::addon::AddOnField;
use crate::domain::capability::Capabilities;
use crate::domain::value::FieldValue;
use crate::forms::{FieldErrors, LooseNumber, loose_flag, loose_text, positive_id};

/// Errors that can occur while processing an add-on payload.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddOnFormError {
    #[error("{0}")]
    Invalid(FieldErrors),
}

/// The `addon` object of an `update_addon` request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AddOnForm {
    fields: Record,
}

impl AddOnForm {
    pub fn new(fields: Record) -> Self {
        Self { fields }
    }

    fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn id(&self) -> Option<i64> {
        positive_id(self.get("id"))
    }

    /// Validates the payload against the fields the live table supports.
    ///
    /// Fields without a backing column are neither validated nor written.
    pub fn into_values(
        self,
        caps: &Capabilities<AddOnField>,
    ) -> Result<Vec<(AddOnField, FieldValue)>, AddOnFormError> {
        let mut errors = FieldErrors::new();
        let mut values = Vec::new();

        if caps.supports(AddOnField::Name) {
            let name = loose_text(self.get("name"));
            if name.is_empty() {
                errors.push("Name is required.");
            } else {
                values.push((AddOnField::Name, FieldValue::text(name)));
            }
        }

        if caps.supports(AddOnField::Price) {
            let price = LooseNumber::parse(self.get("price"))
                .optional(&mut errors, "Price must be numeric.");
            values.push((AddOnField::Price, FieldValue::Real(price)));
        }

        if caps.supports(AddOnField::Description) {
            let description = loose_text(self.get("description"));
            let description = (!description.is_empty()).then_some(description);
            values.push((AddOnField::Description, FieldValue::Text(description)));
        }

        if caps.supports(AddOnField::PerDay) {
            let per_day = loose_flag(self.get("per_day"), false);
            values.push((AddOnField::PerDay, FieldValue::flag(per_day)));
        }

        if caps.supports(AddOnField::SortOrder) {
            let sort_order = LooseNumber::parse(self.get("sort_order"))
                .optional(&mut errors, "Sort order must be numeric.")
                .map(|order| order.trunc() as i64);
            values.push((AddOnField::SortOrder, FieldValue::Integer(sort_order)));
        }

        errors.finish(values).map_err(AddOnFormError::Invalid)
    }
}
