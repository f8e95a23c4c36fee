use serde_json::Value;
use thiserror::Error;

use crate::domain::Record;
use crate::domain::discount::DiscountInput;
use crate::forms::{FieldErrors, LooseNumber};

/// Errors that can occur while processing a discount payload.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiscountFormError {
    #[error("{0}")]
    Invalid(FieldErrors),
}

/// The `discount` object of an `update_discount` request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscountForm {
    fields: Record,
}

impl DiscountForm {
    pub fn new(fields: Record) -> Self {
        Self { fields }
    }

    fn number(&self, key: &str) -> LooseNumber {
        LooseNumber::parse(self.fields.get(key))
    }

    /// Blank prices read as absent; both absent means "remove the discount".
    pub fn into_input(self) -> Result<DiscountInput, DiscountFormError> {
        let mut errors = FieldErrors::new();

        let price_usd = self
            .number("price_USD")
            .optional(&mut errors, "USD price must be numeric.");
        let price_xcd = self
            .number("price_XCD")
            .optional(&mut errors, "XCD price must be numeric.");
        let days = self
            .number("days")
            .optional(&mut errors, "Days must be numeric.")
            .map(|days| days.trunc() as i64);

        errors
            .finish(DiscountInput {
                price_usd,
                price_xcd,
                days,
            })
            .map_err(DiscountFormError::Invalid)
    }
}

impl From<&Value> for DiscountForm {
    fn from(value: &Value) -> Self {
        Self::new(value.as_object().cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numeric_strings_are_accepted() {
        let input = DiscountForm::from(&json!({"price_USD": "50", "price_XCD": "", "days": "3"}))
            .into_input()
            .expect("valid payload");

        assert_eq!(
            input,
            DiscountInput {
                price_usd: Some(50.0),
                price_xcd: None,
                days: Some(3),
            }
        );
        assert!(input.has_price());
    }

    #[test]
    fn blank_prices_mean_no_discount() {
        let input = DiscountForm::from(&json!({"price_USD": "", "days": 2}))
            .into_input()
            .expect("valid payload");

        assert!(!input.has_price());
    }

    #[test]
    fn every_invalid_field_is_reported() {
        let form = DiscountForm::from(&json!({"price_USD": "x", "price_XCD": "y", "days": "z"}));

        let result = form.into_input();

        let Err(DiscountFormError::Invalid(errors)) = result else {
            panic!("expected validation failure");
        };
        assert_eq!(
            errors.to_string(),
            "USD price must be numeric. XCD price must be numeric. Days must be numeric."
        );
    }
}
