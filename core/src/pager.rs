//! Pager — drives a `JsonSource` across API pages.
//!
//! Termination, checked after every page:
//!   - an empty page stops immediately and contributes nothing
//!   - a short page (fewer than `page_size` items) is kept, then stops
//!   - MAX_PAGES requests stop the loop unconditionally (logged, not an error)

use crate::{
    error::ReportResult,
    fetch::{build_query_url, JsonSource},
    normalize::extract_items,
    types::{ParamMap, RawItem},
};

pub const DEFAULT_PAGE_SIZE: usize = 100;
pub const MAX_PAGES: usize = 1000;
pub const DEFAULT_STATUS: &str = "active";

/// Filter params for one page: caller params, a default `status`,
/// and the paging controls (which always override the caller's).
pub fn page_params(filter_params: &ParamMap, page: usize, page_size: usize) -> ParamMap {
    let mut params = filter_params.clone();
    params
        .entry("status".to_string())
        .or_insert_with(|| DEFAULT_STATUS.to_string());
    params.insert("page".to_string(), page.to_string());
    params.insert("page_size".to_string(), page_size.to_string());
    params
}

pub fn fetch_all_pages(
    source: &dyn JsonSource,
    base_url: &str,
    filter_params: &ParamMap,
    page_size: usize,
) -> ReportResult<Vec<RawItem>> {
    let page_size = page_size.max(1);
    let mut all_items = Vec::new();

    for page in 1..=MAX_PAGES {
        let url = build_query_url(base_url, &page_params(filter_params, page, page_size))?;
        let items = extract_items(source.fetch_json(&url)?)?;
        let count = items.len();
        log::debug!("pager: page {page} returned {count} items");

        if count == 0 {
            return Ok(finish(all_items, page));
        }
        all_items.extend(items);
        if count < page_size {
            return Ok(finish(all_items, page));
        }
    }

    log::warn!(
        "pager: stopped after {MAX_PAGES} pages; the source kept returning full pages"
    );
    Ok(all_items)
}

fn finish(items: Vec<RawItem>, pages: usize) -> Vec<RawItem> {
    log::info!("pager: fetched {} items in {pages} pages", items.len());
    items
}
