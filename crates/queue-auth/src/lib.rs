//! NeuVue queue authentication library
//!
//! Resolves the bearer credentials used by the queue client, refreshes
//! them against the queue's token endpoint, and persists them to the
//! user's credential file.
//!
//! Credential flow:
//! 1. `TokenStore::initialize()` picks inline tokens, the environment pair,
//!    local (no-auth) mode, or the credential file, in that order
//! 2. If nothing usable is found it fails with `Error::Unauthenticated`
//! 3. The caller may then run `TokenStore::login()` with a `CodePrompt`,
//!    which exchanges a pasted authorization code and saves the pair
//! 4. The request executor calls `TokenStore::refresh()` after a 401/500
//! 5. File-backed stores rewrite the credential file after every refresh

pub mod constants;
pub mod credentials;
pub mod error;
pub mod login;
pub mod store;
pub mod token;

pub use constants::*;
pub use credentials::TokenPair;
pub use error::{Error, Result};
pub use login::{CodePrompt, StdinPrompt, build_authorization_url};
pub use store::{AuthOptions, CredentialSource, TokenStore};
pub use token::{CodeType, TokenResponse, exchange_code, refresh_token};
