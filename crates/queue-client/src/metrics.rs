//! Request metrics
//!
//! Counters are emitted through the `metrics` facade and are no-ops unless
//! the embedding application installs a recorder.
//!
//! - `queue_requests_total` (counter): labels `method`, `status`
//! - `queue_token_refreshes_total` (counter): label `outcome`
//! - `queue_pages_fetched_total` (counter): label `datatype`, one per page
//!   request that succeeded, so a full listing counts its empty last page

/// Record one physical HTTP exchange.
pub fn record_request(method: &str, status: u16) {
    metrics::counter!("queue_requests_total", "method" => method.to_string(), "status" => status.to_string())
        .increment(1);
}

/// Record a refresh triggered by a 401/500 response.
pub fn record_refresh(outcome: &'static str) {
    metrics::counter!("queue_token_refreshes_total", "outcome" => outcome).increment(1);
}

/// Record one page fetched during depagination, the empty final page
/// included.
pub fn record_page(datatype: &str) {
    metrics::counter!("queue_pages_fetched_total", "datatype" => datatype.to_string())
        .increment(1);
}
