//! Shared primitive types used across the report pipeline.

use std::collections::BTreeMap;

/// One raw item as returned by the remote API or read from a data file.
pub type RawItem = serde_json::Value;

/// A flat parameter mapping sent to the remote source as a query string.
/// Ordered so that generated URLs are stable within this crate.
pub type ParamMap = BTreeMap<String, String>;

/// A single scalar cell of a report row, exactly as the engine returned it.
pub type Scalar = rusqlite::types::Value;
