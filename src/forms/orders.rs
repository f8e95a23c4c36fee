use serde_json::Value;
use thiserror::Error;
use validator::Validate;

use crate::domain::Record;
use crate::domain::order::StatusUpdate;
use crate::forms::{FieldErrors, loose_text, positive_id};

const STATUS_MAX_LEN: u64 = 64;

/// Errors that can occur while processing an order payload.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrderFormError {
    #[error("{0}")]
    Invalid(FieldErrors),
}

#[derive(Debug, Validate)]
struct StatusField<'a> {
    #[validate(length(max = STATUS_MAX_LEN, message = "Status must be at most 64 characters."))]
    status: &'a str,
}

/// The `order` object of an `update_order` request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderForm {
    fields: Record,
}

impl OrderForm {
    pub fn new(fields: Record) -> Self {
        Self { fields }
    }

    pub fn id(&self) -> Option<i64> {
        positive_id(self.fields.get("id"))
    }

    /// Trimmed status; missing or blank becomes the default status.
    pub fn into_status_update(self) -> Result<StatusUpdate, OrderFormError> {
        let status = loose_text(self.fields.get("status"));
        let update = StatusUpdate::new(Some(status.as_str()));

        let mut errors = FieldErrors::new();
        if let Err(validation) = (StatusField {
            status: &update.status,
        })
        .validate()
        {
            errors.extend_validation(&validation);
        }

        errors.finish(update).map_err(OrderFormError::Invalid)
    }
}
