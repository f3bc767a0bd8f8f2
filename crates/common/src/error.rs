//! Configuration error types shared by the binary and its loaders

use thiserror::Error;

/// Errors raised while loading or validating configuration files.
#[derive(Error, Debug)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result alias using the shared configuration Error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_names_the_problem() {
        let err = Error::Config("queue.url must not be empty".into());
        assert_eq!(
            err.to_string(),
            "configuration error: queue.url must not be empty"
        );
    }

    #[test]
    fn io_error_converts_with_question_mark() {
        fn read_missing() -> Result<String> {
            Ok(std::fs::read_to_string("/nonexistent/neuvue-queue.toml")?)
        }
        let err = read_missing().unwrap_err();
        assert!(matches!(err, Error::Io(_)), "got: {err:?}");
        assert!(err.to_string().starts_with("I/O error:"));
    }

    #[test]
    fn toml_error_converts_with_question_mark() {
        fn parse_bad() -> Result<toml::Table> {
            Ok(toml::from_str("[queue\nurl = ")?)
        }
        assert!(matches!(parse_bad().unwrap_err(), Error::Toml(_)));
    }
}
