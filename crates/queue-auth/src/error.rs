//! Error types for queue authentication operations

/// Errors from credential resolution, token exchange and persistence.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("token exchange failed: {0}")]
    TokenExchange(String),

    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("credential parse error: {0}")]
    CredentialParse(String),

    #[error("I/O error: {0}")]
    Io(String),

    /// No usable credential source. Recover by running the login flow.
    #[error("not authenticated: {0}")]
    Unauthenticated(String),
}

/// Result alias for auth operations.
pub type Result<T> = std::result::Result<T, Error>;
