//! Request payload parsing and validation.
//!
//! Admin endpoints receive loosely-typed JSON written by a browser script, so
//! values arrive as numbers or as strings. The helpers here coerce them the
//! same way for every form.

use std::fmt;

use serde_json::Value;
use thiserror::Error;
use validator::ValidationErrors;

use crate::domain::Record;
use crate::domain::value::value_as_i64;

pub mod addons;
pub mod discounts;
pub mod images;
pub mod orders;
pub mod vehicles;

/// Errors raised before an action can be dispatched.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnvelopeError {
    #[error("Invalid JSON payload.")]
    InvalidJson,
    #[error("Unsupported action.")]
    UnsupportedAction,
}

/// Top-level request body: an `action` discriminator plus its arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionEnvelope {
    pub action: String,
    pub body: Record,
}

impl ActionEnvelope {
    /// Parses a JSON object body. Anything else is [`EnvelopeError::InvalidJson`].
    pub fn parse(bytes: &[u8]) -> Result<Self, EnvelopeError> {
        let body = match serde_json::from_slice::<Value>(bytes) {
            Ok(Value::Object(body)) => body,
            _ => return Err(EnvelopeError::InvalidJson),
        };
        let action = match body.get("action") {
            Some(Value::String(action)) => action.clone(),
            _ => String::new(),
        };

        Ok(Self { action, body })
    }

    /// Nested object argument, e.g. `vehicle` or `order`.
    pub fn object(&self, key: &str) -> Option<&Record> {
        self.body.get(key).and_then(Value::as_object)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.body.get(key)
    }
}

/// Accumulates every failed field check into one message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(Vec<String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: impl Into<String>) {
        self.0.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Appends the messages of `validator` failures, ordered by field name.
    pub fn extend_validation(&mut self, errors: &ValidationErrors) {
        let mut fields = errors.field_errors().into_iter().collect::<Vec<_>>();
        fields.sort_by(|(left, _), (right, _)| left.cmp(right));
        for (field, failures) in fields {
            for failure in failures {
                match &failure.message {
                    Some(message) => self.push(message.to_string()),
                    None => self.push(format!("{field} is invalid.")),
                }
            }
        }
    }

    /// `Ok(value)` when nothing failed.
    pub fn finish<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(" "))
    }
}

impl std::error::Error for FieldErrors {}

/// A loosely-typed numeric input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LooseNumber {
    /// Missing, `null` or an empty string.
    Absent,
    Number(f64),
    /// Present but not numeric.
    Invalid,
}

impl LooseNumber {
    pub fn parse(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) => Self::Absent,
            Some(Value::Number(number)) => number.as_f64().map_or(Self::Invalid, Self::Number),
            Some(Value::String(text)) if text.is_empty() => Self::Absent,
            Some(Value::String(text)) => match text.trim().parse::<f64>() {
                Ok(number) if number.is_finite() => Self::Number(number),
                _ => Self::Invalid,
            },
            Some(_) => Self::Invalid,
        }
    }

    /// Required numeric field: absent or invalid values record `message`.
    pub fn required(self, errors: &mut FieldErrors, message: &str) -> f64 {
        match self {
            Self::Number(number) => number,
            Self::Absent | Self::Invalid => {
                errors.push(message);
                0.0
            }
        }
    }

    /// Optional numeric field: absent clears, invalid records `message`.
    pub fn optional(self, errors: &mut FieldErrors, message: &str) -> Option<f64> {
        match self {
            Self::Number(number) => Some(number),
            Self::Absent => None,
            Self::Invalid => {
                errors.push(message);
                None
            }
        }
    }

    /// Falls back to `default` when absent.
    pub fn or(self, default: f64) -> Self {
        match self {
            Self::Absent => Self::Number(default),
            other => other,
        }
    }
}

/// String form of a loosely-typed value, trimmed. `null` and missing are empty.
pub fn loose_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.trim().to_string(),
        Some(Value::Bool(true)) => "1".to_string(),
        Some(Value::Bool(false)) => String::new(),
        Some(other) => other.to_string(),
    }
}

/// Positive integer id from a loosely-typed value; anything else is `None`.
pub fn positive_id(value: Option<&Value>) -> Option<i64> {
    value.and_then(value_as_i64).filter(|id| *id > 0)
}

/// Boolean-like input: only a literal `1` (number or string) is true.
pub fn loose_flag(value: Option<&Value>, default: bool) -> bool {
    match value {
        None | Some(Value::Null) => default,
        Some(Value::Number(number)) => number.as_f64() == Some(1.0),
        Some(Value::String(text)) => text.trim() == "1",
        Some(_) => false,
    }
}
