// Payload validation for API input. Validators take raw JSON and return
// either a normalized typed value or a map of per-field constraint failures;
// they never panic on bad input.
pub mod product;
pub mod user;

pub use product::{
    validate_new_product, validate_product_array, validate_product_patch, NewProduct, ProductPatch,
};
pub use user::{validate_new_user, NewUser};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use std::collections::BTreeMap;

/// Field name -> list of failed constraint messages, ordered for stable output
pub type FieldErrors = BTreeMap<String, Vec<String>>;

pub(crate) fn push_error(errors: &mut FieldErrors, field: &str, message: &str) {
    errors
        .entry(field.to_string())
        .or_default()
        .push(message.to_string());
}

/// Coerce a number or numeric string into a Decimal. Range checks happen at
/// the call site, after coercion.
pub(crate) fn coerce_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => n.to_string().parse().ok(),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                None
            } else {
                s.parse().ok()
            }
        }
        _ => None,
    }
}

/// Coerce a number or numeric string into an integer; fractional values fail.
pub(crate) fn coerce_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i)
            } else {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0)
                    .map(|f| f as i64)
            }
        }
        Value::String(s) => {
            let s = s.trim();
            if let Ok(i) = s.parse::<i64>() {
                Some(i)
            } else {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.fract() == 0.0)
                    .map(|f| f as i64)
            }
        }
        _ => None,
    }
}

/// Optional string field; absent and null both mean None.
/// Err means the field was present with a non-string value.
pub(crate) fn opt_string(obj: &serde_json::Map<String, Value>, key: &str) -> Result<Option<String>, ()> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(()),
    }
}

/// Array-of-strings field defaulting to an empty sequence when absent
pub(crate) fn string_array(obj: &serde_json::Map<String, Value>, key: &str) -> Result<Vec<String>, ()> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                _ => Err(()),
            })
            .collect(),
        Some(_) => Err(()),
    }
}

/// Optional RFC 3339 timestamp field
pub(crate) fn opt_datetime(
    obj: &serde_json::Map<String, Value>,
    key: &str,
) -> Result<Option<DateTime<Utc>>, ()> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => DateTime::parse_from_rfc3339(s)
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .map_err(|_| ()),
        Some(_) => Err(()),
    }
}
