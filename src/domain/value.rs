//! Typed column values and helpers for reading loosely-typed JSON records.

use serde_json::Value;

/// Storage type tag carried by every bound parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Text,
    Integer,
    Real,
}

/// A nullable value tagged with the storage type it binds as.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(Option<String>),
    Integer(Option<i64>),
    Real(Option<f64>),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(Some(value.into()))
    }

    pub fn integer(value: i64) -> Self {
        Self::Integer(Some(value))
    }

    pub fn real(value: f64) -> Self {
        Self::Real(Some(value))
    }

    /// Boolean-like columns are stored as `0`/`1` integers.
    pub fn flag(value: bool) -> Self {
        Self::Integer(Some(i64::from(value)))
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Text(_) => ValueKind::Text,
            Self::Integer(_) => ValueKind::Integer,
            Self::Real(_) => ValueKind::Real,
        }
    }
}

/// A resolved physical column paired with the value to write into it.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub column: String,
    pub value: FieldValue,
}

impl Assignment {
    pub fn new(column: impl Into<String>, value: FieldValue) -> Self {
        Self {
            column: column.into(),
            value,
        }
    }
}

/// Reads an integer out of a JSON value that may hold a number or a numeric string.
pub fn value_as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|float| float.trunc() as i64)),
        Value::String(text) => {
            let text = text.trim();
            text.parse::<i64>().ok().or_else(|| {
                text.parse::<f64>()
                    .ok()
                    .filter(|float| float.is_finite())
                    .map(|float| float.trunc() as i64)
            })
        }
        Value::Bool(flag) => Some(i64::from(*flag)),
        _ => None,
    }
}

/// Reads a float out of a JSON value that may hold a number or a numeric string.
pub fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|float| float.is_finite()),
        _ => None,
    }
}

/// String form used when comparing a stored value against a new one.
///
/// `null` compares as the empty string.
pub fn value_as_comparable(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(Value::Bool(flag)) => if *flag { "1" } else { "" }.to_string(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn field_value_reports_type_tag() {
        assert_eq!(FieldValue::text("a").kind(), ValueKind::Text);
        assert_eq!(FieldValue::flag(true), FieldValue::Integer(Some(1)));
        assert_eq!(FieldValue::Real(None).kind(), ValueKind::Real);
    }

    #[test]
    fn numeric_helpers_accept_numbers_and_strings() {
        assert_eq!(value_as_i64(&json!(7)), Some(7));
        assert_eq!(value_as_i64(&json!("12")), Some(12));
        assert_eq!(value_as_i64(&json!(4.9)), Some(4));
        assert_eq!(value_as_i64(&json!("abc")), None);
        assert_eq!(value_as_f64(&json!("45.5")), Some(45.5));
        assert_eq!(value_as_f64(&json!(null)), None);
    }

    #[test]
    fn comparable_form_treats_null_as_empty() {
        assert_eq!(value_as_comparable(None), "");
        assert_eq!(value_as_comparable(Some(&Value::Null)), "");
        assert_eq!(value_as_comparable(Some(&json!("pending"))), "pending");
        assert_eq!(value_as_comparable(Some(&json!(3))), "3");
    }
}
