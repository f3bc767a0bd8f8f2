//! Depagination
//!
//! Walks a list endpoint page by page (`p = 0, 1, 2, ...`) and concatenates
//! the JSON arrays it returns. An empty page is the only exhaustion signal:
//! a short final page still costs one more round trip to confirm the end.
//! A backend that returns an empty page in the middle of a collection
//! therefore ends the walk early; there is no way to tell the two apart.
//!
//! Any failing page aborts the walk with `Error::Depagination` naming the
//! datatype and page; items from earlier pages are dropped.

use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::executor::Executor;
use crate::metrics;
use crate::request::ApiRequest;
use crate::sieve::Sieve;

pub const DEFAULT_PAGE_SIZE: usize = 15_000;

/// One list query. Only the page index changes between requests.
#[derive(Debug, Clone, PartialEq)]
pub struct PageQuery {
    /// Resource path segment, e.g. `points`.
    pub datatype: String,
    pub sieve: Sieve,
    pub populate: Vec<String>,
    pub select: Vec<String>,
    /// Field names; a leading `-` sorts descending.
    pub sort: Vec<String>,
    /// Stop once this many items are collected. `None` or `Some(0)`
    /// fetches everything.
    pub limit: Option<usize>,
    pub page_size: usize,
}

impl PageQuery {
    pub fn new(datatype: impl Into<String>) -> Self {
        Self {
            datatype: datatype.into(),
            sieve: Sieve::new(),
            populate: Vec::new(),
            select: Vec::new(),
            sort: Vec::new(),
            limit: None,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_sieve(mut self, sieve: Sieve) -> Self {
        self.sieve = sieve;
        self
    }

    pub fn with_populate<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.populate = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_select<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_sort<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sort = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    fn effective_limit(&self) -> Option<usize> {
        self.limit.filter(|&limit| limit > 0)
    }

    /// The GET request for page `page`.
    pub fn page_request(&self, page: usize) -> Result<ApiRequest> {
        Ok(ApiRequest::get(format!("/{}", self.datatype))
            .with_query("p", page.to_string())
            .with_query("q", self.sieve.to_query_string()?)
            .with_list_query("populate", &self.populate)
            .with_list_query("select", &self.select)
            .with_list_query("sort", &self.sort)
            .with_query("pageSize", self.page_size.to_string()))
    }
}

/// Fetch every page of `query` in order and return the concatenation,
/// truncated to the limit when one is set.
pub async fn depaginate(executor: &mut Executor, query: &PageQuery) -> Result<Vec<Value>> {
    let limit = query.effective_limit();
    let mut items: Vec<Value> = Vec::new();
    let mut page = 0usize;

    loop {
        let batch = fetch_page(executor, query, page)
            .await
            .map_err(|source| Error::Depagination {
                datatype: query.datatype.clone(),
                page,
                source: Box::new(source),
            })?;

        debug!(
            datatype = %query.datatype,
            page,
            count = batch.len(),
            "fetched page"
        );
        metrics::record_page(&query.datatype);

        if batch.is_empty() {
            break;
        }
        items.extend(batch);

        if let Some(limit) = limit {
            if items.len() >= limit {
                items.truncate(limit);
                break;
            }
        }
        page += 1;
    }

    Ok(items)
}

async fn fetch_page(executor: &mut Executor, query: &PageQuery, page: usize) -> Result<Vec<Value>> {
    let request = query.page_request(page)?;
    let response = executor.execute(&request).await?.error_for_status()?;
    match response.json::<Value>()? {
        Value::Array(items) => Ok(items),
        other => Err(Error::Decode(format!(
            "expected a JSON array, got {}",
            kind_of(&other)
        ))),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
