//! Replayable request description
//!
//! The executor may send the same request twice (once before and once after
//! a token refresh), so a request is a plain value rather than a closure or
//! a consumed builder. Headers are not part of it: they are rebuilt from
//! the token store on every attempt.

use reqwest::Method;
use serde_json::Value;

/// Method, path, query and optional JSON body of one logical request.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the queue base URL, e.g. `/tasks/42`.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::POST, path).with_body(body)
    }

    pub fn patch(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::PATCH, path).with_body(body)
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Add a comma-joined list parameter, skipping it entirely when the
    /// list has no non-empty entries.
    pub fn with_list_query(self, key: &str, values: &[String]) -> Self {
        let joined = values
            .iter()
            .filter(|v| !v.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(",");
        if joined.is_empty() {
            self
        } else {
            self.with_query(key, joined)
        }
    }
}
