//! Token exchange and refresh
//!
//! Both operations POST `{code, code_type}` as JSON to the queue's own
//! token endpoint (`<base>/auth/tokens`). The queue proxies the exchange
//! to Auth0, so the client never talks to the identity provider directly
//! except through the browser during login.

use serde::{Deserialize, Serialize};

use crate::constants::TOKEN_PATH;
use crate::error::{Error, Result};

/// What the `code` field of a token request carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeType {
    /// An authorization code pasted by the user after browser login
    Authorization,
    /// A refresh token
    Refresh,
}

#[derive(Debug, Serialize)]
struct TokenRequest<'a> {
    code: &'a str,
    code_type: CodeType,
}

/// Response from the token endpoint.
///
/// A refresh may omit `refresh_token`, in which case the caller keeps the
/// one it already has.
#[derive(Debug, Deserialize, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

/// Full URL of the token endpoint for a queue base URL.
pub fn token_url(base_url: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), TOKEN_PATH)
}

/// Exchange an authorization code for an access/refresh pair.
pub async fn exchange_code(
    client: &reqwest::Client,
    base_url: &str,
    code: &str,
) -> Result<TokenResponse> {
    request_token(client, base_url, code, CodeType::Authorization).await
}

/// Exchange a refresh token for a new access token.
pub async fn refresh_token(
    client: &reqwest::Client,
    base_url: &str,
    refresh: &str,
) -> Result<TokenResponse> {
    request_token(client, base_url, refresh, CodeType::Refresh).await
}

async fn request_token(
    client: &reqwest::Client,
    base_url: &str,
    code: &str,
    code_type: CodeType,
) -> Result<TokenResponse> {
    let response = client
        .post(token_url(base_url))
        .json(&TokenRequest { code, code_type })
        .send()
        .await
        .map_err(|e| Error::Http(format!("token request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("<no body>"));

        // 401/403 means the code or refresh token is revoked or invalid
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(Error::InvalidCredentials(format!(
                "token endpoint rejected {code_type:?} code ({status}): {body}"
            )));
        }

        return Err(Error::TokenExchange(format!(
            "token endpoint returned {status}: {body}"
        )));
    }

    response
        .json::<TokenResponse>()
        .await
        .map_err(|e| Error::TokenExchange(format!("invalid token response: {e}")))
}
