//! Record normalization — loosely-typed JSON items to typed loan requests.
//!
//! Coercion is lossy but deterministic:
//!   - numbers, numeric strings and booleans become reals or integers
//!   - blank strings and null become absent values
//!   - anything else (objects, arrays) becomes absent for numeric fields
//!
//! Non-object entries in an item list are dropped, never errored.

use crate::{
    error::{ReportError, ReportResult},
    types::RawItem,
};
use serde_json::{Map, Value};
use std::path::Path;

/// Keys searched, in priority order, when a payload is an object.
pub const ITEM_LIST_KEYS: [&str; 3] = ["data", "items", "results"];

static NULL: Value = Value::Null;

/// One normalized loan request, one row of the `requests` table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LoanRequest {
    pub id: Option<i64>,
    pub amount: Option<f64>,
    pub period_days: Option<i64>,
    pub interest_rate: Option<f64>,
    pub request_type: Option<String>,
    pub status: Option<String>,
    pub created_at: Option<String>,
    pub rating: Option<i64>,
    pub loans_count: Option<i64>,
    pub period_type: Option<String>,
    pub percent_amount: Option<f64>,
}

impl LoanRequest {
    /// Build a request from one raw JSON object. Missing keys become absent values.
    pub fn from_object(obj: &Map<String, Value>) -> ReportResult<Self> {
        let field = |name: &str| obj.get(name).unwrap_or(&NULL);
        Ok(Self {
            id: to_integer("id", field("id"))?,
            amount: to_real("amount", field("amount"))?,
            period_days: to_integer("period_days", field("period_days"))?,
            interest_rate: to_real("interest_rate", field("interest_rate"))?,
            request_type: to_text(field("request_type")),
            status: to_text(field("status")),
            created_at: to_text(field("created_at")),
            rating: to_integer("rating", field("rating"))?,
            loans_count: to_integer("loans_count", field("loans_count"))?,
            period_type: to_text(field("period_type")),
            percent_amount: to_real("percent_amount", field("percent_amount"))?,
        })
    }
}

/// Pull the flat item list out of an arbitrarily-shaped payload.
///
/// A bare list is returned as is. An object yields the first of
/// `data`, `items`, `results` whose value is a list.
pub fn extract_items(payload: Value) -> ReportResult<Vec<RawItem>> {
    match payload {
        Value::Array(items) => Ok(items),
        Value::Object(mut obj) => {
            for key in ITEM_LIST_KEYS {
                if matches!(obj.get(key), Some(Value::Array(_))) {
                    if let Some(Value::Array(items)) = obj.remove(key) {
                        return Ok(items);
                    }
                }
            }
            Err(ReportError::InvalidPayloadShape)
        }
        _ => Err(ReportError::InvalidPayloadShape),
    }
}

/// Read a JSON data file and extract its item list.
pub fn load_items(path: &Path) -> ReportResult<Vec<RawItem>> {
    if path.is_dir() {
        return Err(ReportError::IsADirectory { path: path.display().to_string() });
    }
    if !path.exists() {
        return Err(ReportError::MissingFile { path: path.display().to_string() });
    }
    let content = std::fs::read_to_string(path)?;
    let payload: Value = serde_json::from_str(&content)?;
    let items = extract_items(payload)?;
    log::debug!("loaded {} items from {}", items.len(), path.display());
    Ok(items)
}

/// Normalize every object in `items`, preserving order.
pub fn normalize_items(items: &[RawItem]) -> ReportResult<Vec<LoanRequest>> {
    let mut requests = Vec::with_capacity(items.len());
    let mut skipped = 0usize;
    for item in items {
        match item {
            Value::Object(obj) => requests.push(LoanRequest::from_object(obj)?),
            _ => skipped += 1,
        }
    }
    if skipped > 0 {
        log::warn!("skipped {skipped} non-object entries");
    }
    Ok(requests)
}

pub fn to_real(field: &str, value: &Value) -> ReportResult<Option<f64>> {
    match value {
        Value::Bool(b) => Ok(Some(f64::from(u8::from(*b)))),
        Value::Number(n) => Ok(n.as_f64()),
        Value::String(s) => match s.trim() {
            "" => Ok(None),
            text => text
                .parse::<f64>()
                .map(Some)
                .map_err(|_| invalid_numeric(field, s)),
        },
        _ => Ok(None),
    }
}

pub fn to_integer(field: &str, value: &Value) -> ReportResult<Option<i64>> {
    match value {
        Value::Bool(b) => Ok(Some(i64::from(*b))),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Ok(Some(i)),
            None => n
                .as_f64()
                .map(|f| truncate(field, f, &n.to_string()))
                .transpose(),
        },
        Value::String(s) => match s.trim() {
            "" => Ok(None),
            text => {
                let f = text.parse::<f64>().map_err(|_| invalid_numeric(field, s))?;
                truncate(field, f, s).map(Some)
            }
        },
        _ => Ok(None),
    }
}

/// Text columns keep strings verbatim. Numbers and booleans are stored as
/// their textual form, nested values as compact JSON.
pub fn to_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(if *b { "1" } else { "0" }.to_string()),
        other => Some(other.to_string()),
    }
}

fn truncate(field: &str, f: f64, raw: &str) -> ReportResult<i64> {
    if !f.is_finite() || f >= i64::MAX as f64 || f < i64::MIN as f64 {
        return Err(invalid_numeric(field, raw));
    }
    Ok(f.trunc() as i64)
}

fn invalid_numeric(field: &str, raw: &str) -> ReportError {
    ReportError::InvalidNumericValue {
        field: field.to_string(),
        value: raw.to_string(),
    }
}
