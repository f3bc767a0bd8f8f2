//! Error types for queue client operations

/// Errors from requests against the queue.
///
/// Every error is scoped to the call that produced it; the client (and its
/// credentials) stays usable afterwards.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request never produced a response (connection refused, timeout).
    #[error("HTTP request failed: {0}")]
    Transport(String),

    /// Non-2xx response after the refresh-and-retry policy has run.
    /// `message` is the body's `message` field when present.
    #[error("queue returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("invalid response body: {0}")]
    Decode(String),

    #[error("invalid header: {0}")]
    InvalidHeader(String),

    /// A page fetch failed; everything accumulated so far was discarded.
    #[error("unable to retrieve page {page} of type {datatype}")]
    Depagination {
        datatype: String,
        page: usize,
        #[source]
        source: Box<Error>,
    },

    /// Resource-level wrapper naming the operation and its target.
    #[error("{context}")]
    Request {
        context: String,
        #[source]
        source: Box<Error>,
    },

    /// A caller-supplied argument failed a local check; nothing was sent.
    #[error("validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Auth(#[from] queue_auth::Error),
}

impl Error {
    /// Wrap `self` with the operation that failed, e.g. "unable to get task 42".
    pub fn context(self, context: impl Into<String>) -> Self {
        Error::Request {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Status code of the underlying HTTP failure, looking through wrappers.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Status { status, .. } => Some(*status),
            Error::Depagination { source, .. } | Error::Request { source, .. } => source.status(),
            _ => None,
        }
    }
}

/// Result alias for client operations.
pub type Result<T> = std::result::Result<T, Error>;
