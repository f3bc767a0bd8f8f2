//! Raw responses and status interpretation
//!
//! The executor hands back whatever the final attempt produced. Callers
//! then decide what a status means with `error_for_status`, which turns
//! non-2xx responses into `Error::Status` carrying the backend's own
//! `message` when the body has one.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};

/// What the executor should do with a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Success,
    /// 401 (expired token) or 500 (the queue's reply to a token it cannot
    /// verify): refresh once and resend.
    RefreshAndRetry,
    Failure,
}

/// Classify a response status for the retry policy.
pub fn classify_status(status: StatusCode) -> StatusClass {
    match status.as_u16() {
        200..=299 => StatusClass::Success,
        401 | 500 => StatusClass::RefreshAndRetry,
        _ => StatusClass::Failure,
    }
}

/// Status and body of one completed HTTP exchange.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: StatusCode,
    body: String,
}

impl ApiResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn text(&self) -> &str {
        &self.body
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body).map_err(|e| Error::Decode(e.to_string()))
    }

    /// Fail with `Error::Status` unless the status is 2xx.
    ///
    /// The message is the JSON body's `message` field when present,
    /// otherwise the canonical reason phrase for the status.
    pub fn error_for_status(self) -> Result<Self> {
        if self.status.is_success() {
            return Ok(self);
        }
        Err(Error::Status {
            status: self.status.as_u16(),
            message: self.error_message(),
        })
    }

    fn error_message(&self) -> String {
        serde_json::from_str::<serde_json::Value>(&self.body)
            .ok()
            .and_then(|body| match body.get("message") {
                Some(serde_json::Value::String(message)) => Some(message.clone()),
                Some(other) => Some(other.to_string()),
                None => None,
            })
            .unwrap_or_else(|| {
                self.status
                    .canonical_reason()
                    .unwrap_or("unknown status")
                    .to_string()
            })
    }
}
