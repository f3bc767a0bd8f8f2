//! Interactive login
//!
//! The user opens the authorization URL in a browser, signs in, and pastes
//! the code shown on the token page back into the client. Reading that code
//! sits behind `CodePrompt` so the login flow can run without a terminal.

use std::io::{BufRead, Write};

use crate::constants::{AUDIENCE, AUTHORIZE_ENDPOINT, CLIENT_ID, REDIRECT_URI, SCOPES};
use crate::error::{Error, Result};

/// Source of the authorization code pasted by the user.
pub trait CodePrompt {
    /// Show `authorization_url` to the user and return the code they enter.
    fn prompt_code(&mut self, authorization_url: &str) -> Result<String>;
}

/// Prompts on stderr and reads one line from stdin.
#[derive(Debug, Default)]
pub struct StdinPrompt;

impl CodePrompt for StdinPrompt {
    fn prompt_code(&mut self, authorization_url: &str) -> Result<String> {
        let mut stderr = std::io::stderr();
        writeln!(
            stderr,
            "Go to this link:\n  {authorization_url}\nand log in with your Google account, \
             then paste the text from the Token page here:"
        )
        .map_err(|e| Error::Io(format!("writing login prompt: {e}")))?;

        let mut line = String::new();
        std::io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|e| Error::Io(format!("reading authorization code: {e}")))?;

        let code = line.trim();
        if code.is_empty() {
            return Err(Error::Unauthenticated("no authorization code entered".into()));
        }
        Ok(code.to_owned())
    }
}

/// Build the browser URL that starts the login.
pub fn build_authorization_url() -> String {
    format!(
        "{}?response_type=code&client_id={}&redirect_uri={}&scope={}&audience={}",
        AUTHORIZE_ENDPOINT,
        CLIENT_ID,
        REDIRECT_URI,
        SCOPES.replace(' ', "%20"),
        AUDIENCE,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authorization_url_contains_required_params() {
        let url = build_authorization_url();

        assert!(url.starts_with(AUTHORIZE_ENDPOINT));
        assert!(url.contains("response_type=code"));
        assert!(url.contains(&format!("client_id={CLIENT_ID}")));
        assert!(url.contains("redirect_uri=https://app.neuvue.io/token"));
        assert!(url.contains("scope=openid%20profile%20email%20offline_access"));
        assert!(url.contains("audience=https://queue.neuvue.io"));
        assert!(!url.contains(' '), "url must not contain raw spaces: {url}");
    }
}
