//! Token store
//!
//! Holds the access/refresh pair for one client. `refresh()` is the only
//! method that changes the tokens after construction, and it takes
//! `&mut self`, so every rotation goes through one auditable point. The
//! store is owned by the request executor; callers that want to share a
//! client across tasks must wrap it in their own lock.

use std::path::PathBuf;
use std::time::Duration;

use common::Secret;
use tracing::{debug, info};

use crate::constants::{ACCESS_TOKEN_ENV, REFRESH_TOKEN_ENV};
use crate::credentials::{self, TokenPair};
use crate::error::{Error, Result};
use crate::login::{CodePrompt, build_authorization_url};
use crate::token;

/// Where the current credentials came from.
///
/// Decides what a refresh persists: file-backed stores rewrite the
/// credential file; the other sources only update memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Inline,
    Environment,
    ConfigFile,
    /// No-auth mode for a locally running queue. No Authorization header is
    /// sent and 401/500 responses never trigger a refresh.
    Local,
}

impl CredentialSource {
    /// Human-readable label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            CredentialSource::Inline => "inline arguments",
            CredentialSource::Environment => "environment variables",
            CredentialSource::ConfigFile => "config file",
            CredentialSource::Local => "local (no auth)",
        }
    }
}

/// Inputs for resolving credentials.
#[derive(Debug, Clone)]
pub struct AuthOptions {
    /// Queue base URL; the token endpoint lives under it.
    pub base_url: String,
    /// Tokens passed in directly. Takes precedence over every other source.
    pub tokens: Option<TokenPair>,
    /// Run without authentication.
    pub local: bool,
    /// Credential file override. Defaults to `~/.neuvuequeue/neuvuequeue.cfg`.
    pub credentials_path: Option<PathBuf>,
    /// Request timeout for the HTTP client built alongside the store. The
    /// store shares that client, so refresh and login calls are bounded too.
    pub timeout: Option<Duration>,
}

impl AuthOptions {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            tokens: None,
            local: false,
            credentials_path: None,
            timeout: None,
        }
    }

    pub fn with_tokens(mut self, access: impl Into<String>, refresh: impl Into<String>) -> Self {
        self.tokens = Some(TokenPair::new(access, refresh));
        self
    }

    pub fn local(mut self, local: bool) -> Self {
        self.local = local;
        self
    }

    pub fn with_credentials_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.credentials_path = Some(path.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Current credentials plus what is needed to refresh and persist them.
#[derive(Debug)]
pub struct TokenStore {
    http: reqwest::Client,
    base_url: String,
    source: CredentialSource,
    /// `None` only in local mode.
    tokens: Option<TokenPair>,
    /// Set only for file-backed stores.
    credentials_path: Option<PathBuf>,
}

impl TokenStore {
    /// Resolve credentials without any console interaction.
    ///
    /// Order: inline tokens, the environment pair, local mode, then the
    /// credential file. A file-backed store refreshes once straight away,
    /// since the stored access token is usually expired, and persists the
    /// result. Fails with `Error::Unauthenticated` when no source yields a
    /// usable token; `login()` is the recovery path.
    pub async fn initialize(http: reqwest::Client, options: AuthOptions) -> Result<Self> {
        let AuthOptions {
            base_url,
            tokens,
            local,
            credentials_path,
            ..
        } = options;

        if let Some(tokens) = tokens {
            if tokens.access_token.is_empty() {
                return Err(Error::Unauthenticated(
                    "inline access token is empty".into(),
                ));
            }
            return Ok(Self::resolved(
                http,
                base_url,
                CredentialSource::Inline,
                Some(tokens),
                None,
            ));
        }

        if let Some(tokens) = tokens_from_env() {
            return Ok(Self::resolved(
                http,
                base_url,
                CredentialSource::Environment,
                Some(tokens),
                None,
            ));
        }

        if local {
            return Ok(Self::resolved(
                http,
                base_url,
                CredentialSource::Local,
                None,
                None,
            ));
        }

        let path = path_or_default(credentials_path)?;
        let tokens = credentials::load(&path).await?.ok_or_else(|| {
            Error::Unauthenticated(format!(
                "no credentials found in {} or {ACCESS_TOKEN_ENV}/{REFRESH_TOKEN_ENV}; please log in",
                path.display()
            ))
        })?;
        if tokens.refresh_token.is_empty() {
            return Err(Error::Unauthenticated(format!(
                "credential file {} has no refresh token; please log in",
                path.display()
            )));
        }

        let mut store = Self::resolved(
            http,
            base_url,
            CredentialSource::ConfigFile,
            Some(tokens),
            Some(path),
        );
        store.refresh().await?;
        Ok(store)
    }

    /// Interactive login: prompt for an authorization code, exchange it,
    /// and save the resulting pair to the credential file.
    ///
    /// Returns a file-backed store; later refreshes keep the file current.
    pub async fn login(
        http: reqwest::Client,
        options: AuthOptions,
        prompt: &mut dyn CodePrompt,
    ) -> Result<Self> {
        let path = path_or_default(options.credentials_path)?;
        let code = prompt.prompt_code(&build_authorization_url())?;

        let response = token::exchange_code(&http, &options.base_url, &code).await?;
        let tokens = TokenPair::new(
            response.access_token,
            response.refresh_token.unwrap_or_default(),
        );
        credentials::save(&path, &tokens).await?;
        info!(path = %path.display(), "login succeeded, credentials saved");

        Ok(Self::resolved(
            http,
            options.base_url,
            CredentialSource::ConfigFile,
            Some(tokens),
            Some(path),
        ))
    }

    fn resolved(
        http: reqwest::Client,
        base_url: String,
        source: CredentialSource,
        tokens: Option<TokenPair>,
        credentials_path: Option<PathBuf>,
    ) -> Self {
        info!(auth_method = source.label(), "credentials resolved");
        Self {
            http,
            base_url,
            source,
            tokens,
            credentials_path,
        }
    }

    /// Exchange the refresh token for a new access token.
    ///
    /// On success the in-memory access token is replaced (and the refresh
    /// token too, if the endpoint rotated it); a file-backed store then
    /// rewrites the credential file. On failure the old tokens are kept and
    /// the endpoint's error is returned unchanged. No retry happens here.
    pub async fn refresh(&mut self) -> Result<()> {
        let tokens = self.tokens.as_mut().ok_or_else(|| {
            Error::Unauthenticated("local mode has no credentials to refresh".into())
        })?;
        if tokens.refresh_token.is_empty() {
            return Err(Error::Unauthenticated(
                "no refresh token available; please log in".into(),
            ));
        }

        let response =
            token::refresh_token(&self.http, &self.base_url, tokens.refresh_token.expose()).await?;

        tokens.access_token = Secret::new(response.access_token);
        if let Some(rotated) = response.refresh_token.filter(|t| !t.is_empty()) {
            tokens.refresh_token = Secret::new(rotated);
        }

        match (self.source, &self.credentials_path) {
            (CredentialSource::ConfigFile, Some(path)) => {
                credentials::save(path, tokens).await?;
            }
            (CredentialSource::Environment, _) => {
                debug!("environment credentials refreshed in memory only");
            }
            _ => {}
        }

        info!(auth_method = self.source.label(), "access token refreshed");
        Ok(())
    }

    /// The access token to send as a bearer credential. `None` in local mode.
    pub fn current_access_token(&self) -> Option<&str> {
        self.tokens
            .as_ref()
            .map(|tokens| tokens.access_token.expose().as_str())
    }

    pub fn is_local(&self) -> bool {
        self.source == CredentialSource::Local
    }

    pub fn source(&self) -> CredentialSource {
        self.source
    }
}

fn path_or_default(path: Option<PathBuf>) -> Result<PathBuf> {
    match path {
        Some(path) => Ok(path),
        None => credentials::default_path(),
    }
}

/// Both variables must be set and non-empty for the environment to count.
fn tokens_from_env() -> Option<TokenPair> {
    let access = std::env::var(ACCESS_TOKEN_ENV).ok().filter(|v| !v.is_empty())?;
    let refresh = std::env::var(REFRESH_TOKEN_ENV).ok().filter(|v| !v.is_empty())?;
    Some(TokenPair::new(access, refresh))
}
