//! Authenticated request executor
//!
//! Sends one logical request with a bounded retry policy: if the queue
//! answers 401 or 500 and the client is not in local mode, the token store
//! refreshes exactly once and the same request is sent exactly once more.
//! Whatever that second attempt returns is handed back as-is; there is no
//! further retry. Interpreting the status is the caller's job.

use std::str::FromStr;
use std::time::Duration;

use queue_auth::TokenStore;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::metrics;
use crate::request::ApiRequest;
use crate::response::{ApiResponse, StatusClass, classify_status};

/// Extra header sent with every request (name + value pair from config).
#[derive(Debug, Clone, Deserialize)]
pub struct HeaderInjection {
    pub name: String,
    pub value: String,
}

/// Owns the HTTP client and the token store for one queue.
///
/// `execute` takes `&mut self` because a refresh mutates the token store;
/// one executor therefore never runs two requests at once.
#[derive(Debug)]
pub struct Executor {
    http: reqwest::Client,
    base_url: String,
    tokens: TokenStore,
    custom_headers: HeaderMap,
    timeout: Option<Duration>,
}

impl Executor {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, tokens: TokenStore) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            tokens,
            custom_headers: HeaderMap::new(),
            timeout: None,
        }
    }

    /// Add headers sent with every request. Invalid names or values are
    /// skipped with a warning; `authorization` is never overridden.
    pub fn with_headers(mut self, injections: &[HeaderInjection]) -> Self {
        for injection in injections {
            let name = match HeaderName::from_str(&injection.name) {
                Ok(n) => n,
                Err(e) => {
                    warn!(header = %injection.name, error = %e, "skipping invalid header name");
                    continue;
                }
            };
            if name == AUTHORIZATION {
                warn!(header = %injection.name, "refusing to override authorization header");
                continue;
            }
            let value = match HeaderValue::from_str(&injection.value) {
                Ok(v) => v,
                Err(e) => {
                    warn!(header = %injection.name, error = %e, "skipping invalid header value");
                    continue;
                }
            };
            self.custom_headers.insert(name, value);
        }
        self
    }

    /// Per-request timeout passed through to the HTTP client.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token_store(&self) -> &TokenStore {
        &self.tokens
    }

    /// Fully qualified URL for a path relative to the base URL.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Headers for the next attempt: JSON content type, the bearer token
    /// unless in local mode, then any configured extras.
    pub fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if !self.tokens.is_local() {
            if let Some(token) = self.tokens.current_access_token() {
                let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                    .map_err(|e| Error::InvalidHeader(format!("access token: {e}")))?;
                value.set_sensitive(true);
                headers.insert(AUTHORIZATION, value);
            }
        }

        for (name, value) in &self.custom_headers {
            headers.insert(name.clone(), value.clone());
        }
        Ok(headers)
    }

    /// Send `request`, refreshing and resending once after a 401/500.
    ///
    /// Returns the final response whatever its status. Errors only when no
    /// response was obtained or the refresh itself failed.
    pub async fn execute(&mut self, request: &ApiRequest) -> Result<ApiResponse> {
        let response = self.send(request).await?;

        if classify_status(response.status()) != StatusClass::RefreshAndRetry
            || self.tokens.is_local()
        {
            return Ok(response);
        }

        warn!(
            method = %request.method,
            path = %request.path,
            status = response.status().as_u16(),
            "request rejected, refreshing token and retrying once"
        );
        if let Err(e) = self.tokens.refresh().await {
            metrics::record_refresh("failure");
            return Err(e.into());
        }
        metrics::record_refresh("success");

        self.send(request).await
    }

    /// One physical HTTP exchange with freshly built headers.
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let mut builder = self
            .http
            .request(request.method.clone(), self.url(&request.path))
            .headers(self.headers()?);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            let encoded =
                serde_json::to_vec(body).map_err(|e| Error::Decode(format!("encoding body: {e}")))?;
            builder = builder.body(encoded);
        }
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Error::Transport(format!("{} {}: {e}", request.method, request.path)))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Transport(format!("reading response body: {e}")))?;

        metrics::record_request(request.method.as_str(), status.as_u16());
        debug!(
            method = %request.method,
            path = %request.path,
            status = status.as_u16(),
            "queue request completed"
        );
        Ok(ApiResponse::new(status, body))
    }
}
