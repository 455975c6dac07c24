//! Generic pagination over KuCoin's paged endpoints.
//!
//! Paged responses carry `{items, currentPage, pageSize, totalPage}`.
//! [`auto_paginate`] drives a caller-supplied single-page fetch function
//! sequentially — each page's query depends on the previous page's
//! reported position, so pages are never fetched concurrently — and
//! collects one batch per page.
//!
//! # Termination
//!
//! Fetching stops when the reported `currentPage` reaches `totalPage` or
//! the configured page limit. If a response carries only one of the two
//! counter fields, pagination stops after that page instead of erroring;
//! this mirrors the exchange-facing behavior for endpoints that return a
//! plain collection without counters, and a warning is logged so a
//! malformed feed is still visible in the logs.

use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use tracing::{debug, warn};

use crate::error::{KucoinError, Result};

/// Query parameters for one page fetch.
#[derive(Clone, Copy, Debug)]
pub struct PageQuery {
    pub current_page: u32,
    pub page_size: u32,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            current_page: 1,
            page_size: 50,
        }
    }
}

impl PageQuery {
    /// Renders the query as request parameters (`currentPage`, `pageSize`).
    pub fn params(&self) -> HashMap<String, String> {
        let mut params = HashMap::new();
        params.insert("currentPage".to_string(), self.current_page.to_string());
        params.insert("pageSize".to_string(), self.page_size.to_string());
        params
    }
}

/// Field names and limits for one pagination run.
///
/// The defaults match KuCoin's paged envelope; override the fields for
/// endpoints that name their counters differently, e.g.
/// `Paginator { page_field: "page", ..Default::default() }`.
#[derive(Clone, Copy, Debug)]
pub struct Paginator {
    pub items_field: &'static str,
    pub page_field: &'static str,
    pub total_page_field: &'static str,
    pub max_pages: Option<u32>,
}

impl Default for Paginator {
    fn default() -> Self {
        Self {
            items_field: "items",
            page_field: "currentPage",
            total_page_field: "totalPage",
            max_pages: None,
        }
    }
}

impl Paginator {
    /// Caps the number of page fetches.
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = Some(max_pages);
        self
    }
}

/// Fetches pages sequentially and returns one batch per page, in page
/// order.
///
/// Each batch is the response's items field, or the entire response when
/// that field is absent (for endpoints that return a bare collection).
/// A fetch failure on any page aborts the whole run with
/// [`KucoinError::PaginationFailed`] naming the page; partial results are
/// never returned.
pub async fn auto_paginate<F, Fut>(
    fetch_page: F,
    initial: PageQuery,
    opts: Paginator,
) -> Result<Vec<Value>>
where
    F: FnMut(PageQuery) -> Fut,
    Fut: Future<Output = Result<Value>>,
{
    auto_paginate_with(fetch_page, initial, opts, |batches| batches).await
}

/// [`auto_paginate`] with a caller-supplied reducer over the collected
/// batches, e.g. [`flatten_batches`] to concatenate them.
pub async fn auto_paginate_with<F, Fut, R, T>(
    mut fetch_page: F,
    initial: PageQuery,
    opts: Paginator,
    reduce: R,
) -> Result<T>
where
    F: FnMut(PageQuery) -> Fut,
    Fut: Future<Output = Result<Value>>,
    R: FnOnce(Vec<Value>) -> T,
{
    let mut batches: Vec<Value> = Vec::new();
    let mut query = initial;

    loop {
        debug!("Fetching page {}", query.current_page);
        let response =
            fetch_page(query)
                .await
                .map_err(|err| KucoinError::PaginationFailed {
                    page: query.current_page,
                    source: Box::new(err),
                })?;

        let current_page = read_counter(&response, opts.page_field);
        let total_page = read_counter(&response, opts.total_page_field);

        let batch = match response {
            Value::Object(mut fields) => match fields.remove(opts.items_field) {
                Some(items) => items,
                None => Value::Object(fields),
            },
            other => other,
        };
        batches.push(batch);

        if let (Some(current), Some(max)) = (current_page, opts.max_pages) {
            if current >= max {
                debug!("Stopping pagination at page {} (max_pages = {})", current, max);
                break;
            }
        }

        match (current_page, total_page) {
            (Some(current), Some(total)) => {
                if current >= total {
                    break;
                }
                query.current_page = current + 1;
            }
            (Some(current), None) => {
                warn!(
                    "Pagination stopped at page {}: response is missing the '{}' field",
                    current, opts.total_page_field
                );
                break;
            }
            (None, Some(_)) => {
                warn!(
                    "Pagination stopped at page {}: response is missing the '{}' field",
                    query.current_page, opts.page_field
                );
                break;
            }
            (None, None) => break,
        }
    }

    Ok(reduce(batches))
}

/// Reducer that concatenates per-page batches into one flat item list.
///
/// Array batches are spliced in; a non-array batch contributes itself as a
/// single item.
pub fn flatten_batches(batches: Vec<Value>) -> Vec<Value> {
    batches
        .into_iter()
        .flat_map(|batch| match batch {
            Value::Array(items) => items,
            other => vec![other],
        })
        .collect()
}

fn read_counter(response: &Value, field: &str) -> Option<u32> {
    response
        .get(field)
        .and_then(Value::as_u64)
        .and_then(|value| u32::try_from(value).ok())
}
