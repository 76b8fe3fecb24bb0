//! Shared helpers for integration tests.

#![allow(dead_code)]

use kapusta_core::{error::ReportResult, fetch::JsonSource};
use serde_json::{json, Value};
use std::cell::RefCell;
use url::Url;

/// A `JsonSource` that answers each page with a scripted number of items
/// and records every URL it was asked for.
pub struct ScriptedSource {
    items_on_page: Box<dyn Fn(usize) -> usize>,
    pub requests: RefCell<Vec<String>>,
}

impl ScriptedSource {
    /// Page `n` (1-based) returns `sizes[n - 1]` items; later pages are empty.
    pub fn pages(sizes: Vec<usize>) -> Self {
        Self::with(move |page| sizes.get(page - 1).copied().unwrap_or(0))
    }

    pub fn with(items_on_page: impl Fn(usize) -> usize + 'static) -> Self {
        init_logging();
        Self {
            items_on_page: Box::new(items_on_page),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }

    pub fn query_of(&self, index: usize) -> std::collections::BTreeMap<String, String> {
        let url = Url::parse(&self.requests.borrow()[index]).unwrap();
        url.query_pairs().into_owned().collect()
    }
}

impl JsonSource for ScriptedSource {
    fn fetch_json(&self, url: &str) -> ReportResult<Value> {
        self.requests.borrow_mut().push(url.to_string());
        let page: usize = Url::parse(url)
            .unwrap()
            .query_pairs()
            .find(|(k, _)| k == "page")
            .map(|(_, v)| v.parse().unwrap())
            .unwrap_or(1);
        let items: Vec<Value> = (0..(self.items_on_page)(page))
            .map(|i| loan(page * 1000 + i, 500.0, 30, 50))
            .collect();
        Ok(json!({ "data": items }))
    }
}

/// Route `log` output through the test harness. Safe to call repeatedly.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// One raw loan request in the shape the remote API returns.
pub fn loan(id: usize, amount: f64, period_days: i64, rating: i64) -> Value {
    json!({
        "id": id,
        "amount": amount.to_string(),
        "period_days": period_days,
        "interest_rate": "700",
        "request_type": "lend",
        "status": "active",
        "created_at": "2024-05-01T10:00:00Z",
        "rating": rating,
        "loans_count": "3",
        "period_type": "days",
        "percent_amount": null,
    })
}
