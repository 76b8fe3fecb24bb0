//! Pager termination and parameter tests.

mod common;

use common::ScriptedSource;
use kapusta_core::{
    error::{ReportError, ReportResult},
    fetch::JsonSource,
    pager::{fetch_all_pages, page_params, DEFAULT_PAGE_SIZE, MAX_PAGES},
    types::ParamMap,
};
use serde_json::{json, Value};

const BASE: &str = "https://api.example.test/loans/?stale=1";

fn filters() -> ParamMap {
    ParamMap::from([
        ("amount_min".to_string(), "500".to_string()),
        ("rating_min".to_string(), "45".to_string()),
        ("period_days_max".to_string(), String::new()),
    ])
}

/// A short page is kept and ends paging without a further request.
#[test]
fn short_page_is_the_last_one() {
    let source = ScriptedSource::pages(vec![100, 100, 37]);

    let items = fetch_all_pages(&source, BASE, &filters(), DEFAULT_PAGE_SIZE).unwrap();

    assert_eq!(items.len(), 237);
    assert_eq!(source.request_count(), 3);
}

/// An empty page stops immediately and contributes nothing.
#[test]
fn empty_page_stops_paging() {
    let source = ScriptedSource::pages(vec![100, 0, 100]);

    let items = fetch_all_pages(&source, BASE, &filters(), DEFAULT_PAGE_SIZE).unwrap();

    assert_eq!(items.len(), 100);
    assert_eq!(source.request_count(), 2);
}

#[test]
fn empty_first_page_yields_nothing() {
    let source = ScriptedSource::pages(vec![]);

    let items = fetch_all_pages(&source, BASE, &filters(), DEFAULT_PAGE_SIZE).unwrap();

    assert!(items.is_empty());
    assert_eq!(source.request_count(), 1);
}

/// A source that always returns full pages is cut off at the page cap.
#[test]
fn page_cap_bounds_requests() {
    let source = ScriptedSource::with(|_| 1);

    let items = fetch_all_pages(&source, BASE, &ParamMap::new(), 1).unwrap();

    assert_eq!(source.request_count(), MAX_PAGES);
    assert_eq!(items.len(), MAX_PAGES);
}

/// Items are accumulated in page order.
#[test]
fn items_keep_page_order() {
    let source = ScriptedSource::pages(vec![2, 2, 1]);

    let items = fetch_all_pages(&source, BASE, &ParamMap::new(), 2).unwrap();

    let ids: Vec<u64> = items.iter().map(|i| i["id"].as_u64().unwrap()).collect();
    assert_eq!(ids, vec![1000, 1001, 2000, 2001, 3000]);
}

#[test]
fn requests_carry_filters_status_and_paging() {
    let source = ScriptedSource::pages(vec![100, 5]);

    fetch_all_pages(&source, BASE, &filters(), DEFAULT_PAGE_SIZE).unwrap();

    let first = source.query_of(0);
    assert_eq!(first["amount_min"], "500");
    assert_eq!(first["rating_min"], "45");
    assert_eq!(first["status"], "active");
    assert_eq!(first["page"], "1");
    assert_eq!(first["page_size"], "100");
    assert!(!first.contains_key("period_days_max"), "empty values are dropped");
    assert!(!first.contains_key("stale"), "base query is replaced");

    assert_eq!(source.query_of(1)["page"], "2");
}

#[test]
fn caller_status_is_not_overridden() {
    let mut params = filters();
    params.insert("status".into(), "closed".into());
    params.insert("page".into(), "9".into());

    let merged = page_params(&params, 3, 50);

    assert_eq!(merged["status"], "closed");
    assert_eq!(merged["page"], "3");
    assert_eq!(merged["page_size"], "50");
}

struct ShapelessSource;

impl JsonSource for ShapelessSource {
    fn fetch_json(&self, _url: &str) -> ReportResult<Value> {
        Ok(json!({"rows": []}))
    }
}

#[test]
fn unrecognized_payload_shape_is_an_error() {
    let result = fetch_all_pages(&ShapelessSource, BASE, &ParamMap::new(), DEFAULT_PAGE_SIZE);
    assert!(matches!(result, Err(ReportError::InvalidPayloadShape)));
}
