//! Configuration types and loading
//!
//! The file path comes from `--config` or `CONFIG_PATH` (see `cli`);
//! `NEUVUEQUEUE_URL` then overrides the file's queue URL.
//! Tokens never live in this file; they come from the environment or the
//! credential file managed by `queue-auth`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use queue_auth::AuthOptions;
use queue_client::{DEFAULT_PAGE_SIZE, HeaderInjection};
use serde::Deserialize;

/// Overrides `queue.url` when set.
pub const URL_ENV: &str = "NEUVUEQUEUE_URL";

/// Root configuration
#[derive(Debug, Deserialize)]
pub struct Config {
    pub queue: QueueConfig,
    #[serde(default)]
    pub headers: Vec<HeaderInjection>,
}

/// Queue connection settings
#[derive(Debug, Deserialize)]
pub struct QueueConfig {
    pub url: String,
    /// Talk to a local queue without authentication.
    #[serde(default)]
    pub local: bool,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// Credential file override (default `~/.neuvuequeue/neuvuequeue.cfg`).
    #[serde(default)]
    pub credentials_path: Option<PathBuf>,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

impl Config {
    /// Load configuration from a TOML file, then overlay environment variables.
    pub fn load(path: &Path) -> common::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&contents)?;

        if let Ok(url) = std::env::var(URL_ENV) {
            config.queue.url = url;
        }
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> common::Result<()> {
        if !self.queue.url.starts_with("http://") && !self.queue.url.starts_with("https://") {
            return Err(common::Error::Config(format!(
                "queue.url must start with http:// or https://, got: {}",
                self.queue.url
            )));
        }
        if self.queue.page_size == 0 {
            return Err(common::Error::Config(
                "page_size must be greater than 0".into(),
            ));
        }
        if self.queue.timeout_secs == Some(0) {
            return Err(common::Error::Config(
                "timeout_secs must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// Credential resolution inputs for this queue, timeout included so
    /// token calls are bounded like every other request.
    pub fn auth_options(&self) -> AuthOptions {
        let mut options = AuthOptions::new(&self.queue.url).local(self.queue.local);
        if let Some(path) = &self.queue.credentials_path {
            options = options.with_credentials_path(path);
        }
        if let Some(timeout) = self.timeout() {
            options = options.with_timeout(timeout);
        }
        options
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.queue.timeout_secs.map(Duration::from_secs)
    }
}
