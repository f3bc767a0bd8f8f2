//! CLI-specific error types

use thiserror::Error;

/// Argument and dispatch errors. Queue and auth failures arrive as
/// `neuvue_queue::Error` and are reported through `anyhow`.
#[derive(Error, Debug)]
pub enum Error {
    #[error("unknown datatype `{0}`")]
    UnknownDatatype(String),

    #[error("invalid sieve: {0}")]
    InvalidSieve(String),

    #[error("`{command}` is not supported for {datatype}")]
    Unsupported { command: String, datatype: String },
}

/// Result alias using CLI Error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages_are_descriptive() {
        assert_eq!(
            Error::UnknownDatatype("questions".into()).to_string(),
            "unknown datatype `questions`"
        );
        assert_eq!(
            Error::Unsupported {
                command: "delete".into(),
                datatype: "points".into()
            }
            .to_string(),
            "`delete` is not supported for points"
        );
        assert!(Error::InvalidSieve("expected value".into())
            .to_string()
            .starts_with("invalid sieve"));
    }
}
