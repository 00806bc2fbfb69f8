//! Server-side normalization for bulk product updates.
//!
//! The wire contract is a list of partial records (`{id, msc?, price?}`),
//! one per selected row. The current client always sends identical field
//! values across the batch, and the server enforces that: a heterogeneous
//! batch is rejected rather than silently applying the first record's shape
//! to every row.

use rust_decimal::Decimal;
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::database::is_candidate_id;
use crate::error::ApiError;

/// The shared patch applied across every row in a bulk update. Fields left
/// `None` are untouched on every matched row.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BulkPatch {
    pub price: Option<Decimal>,
    pub msc: Option<bool>,
}

impl BulkPatch {
    pub fn is_empty(&self) -> bool {
        self.price.is_none() && self.msc.is_none()
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum BulkError {
    #[error("Expected a list of products")]
    NotAList,

    #[error("No products to update")]
    NoProducts,

    #[error("No fields to update")]
    NoFields,

    #[error("Invalid product ID")]
    InvalidId,

    #[error("All products in a bulk update must share the same field values")]
    Heterogeneous,

    #[error("Price must be a number")]
    PriceNotNumeric,

    #[error("Price must be greater than zero")]
    PriceOutOfRange,

    #[error("Msc must be a boolean")]
    MscNotBoolean,
}

impl From<BulkError> for ApiError {
    fn from(err: BulkError) -> Self {
        ApiError::bad_request(err.to_string())
    }
}

/// Normalize a `{"products": [{id, msc?, price?}, ...]}` request body into
/// an id set plus one shared patch.
///
/// All-or-nothing: any malformed id or field rejects the whole batch. Every
/// record must carry the identical set of non-id fields with identical
/// values. A charset-valid id that does not parse as a UUID cannot exist in
/// the store and is dropped from the id set rather than failing the batch.
pub fn normalize_batch(body: &Value) -> Result<(Vec<Uuid>, BulkPatch), BulkError> {
    let records = body
        .get("products")
        .and_then(Value::as_array)
        .ok_or(BulkError::NotAList)?;

    if records.is_empty() {
        return Err(BulkError::NoProducts);
    }

    let mut ids = Vec::with_capacity(records.len());
    let mut shared: Option<BulkPatch> = None;

    for record in records {
        let obj = record.as_object().ok_or(BulkError::NotAList)?;

        let id = obj
            .get("id")
            .and_then(Value::as_str)
            .filter(|id| is_candidate_id(id))
            .ok_or(BulkError::InvalidId)?;

        let patch = record_patch(obj)?;
        match &shared {
            None => shared = Some(patch),
            Some(first) if *first != patch => return Err(BulkError::Heterogeneous),
            Some(_) => {}
        }

        if let Ok(uuid) = Uuid::parse_str(id) {
            ids.push(uuid);
        }
    }

    // Non-empty records guarantee shared is set by now
    let patch = shared.unwrap_or_default();
    if patch.is_empty() {
        return Err(BulkError::NoFields);
    }

    Ok((ids, patch))
}

fn record_patch(obj: &serde_json::Map<String, Value>) -> Result<BulkPatch, BulkError> {
    let price = match obj.get("price") {
        None | Some(Value::Null) => None,
        Some(raw) => {
            let price =
                crate::schemas::coerce_decimal(raw).ok_or(BulkError::PriceNotNumeric)?;
            if price <= Decimal::ZERO {
                return Err(BulkError::PriceOutOfRange);
            }
            Some(price)
        }
    };

    let msc = match obj.get("msc") {
        None | Some(Value::Null) => None,
        Some(Value::Bool(b)) => Some(*b),
        Some(_) => return Err(BulkError::MscNotBoolean),
    };

    Ok(BulkPatch { price, msc })
}
