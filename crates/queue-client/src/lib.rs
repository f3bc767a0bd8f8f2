//! NeuVue queue request core
//!
//! Every accessor in `neuvue-queue` goes through the same two pieces:
//! the `Executor`, which sends one request and retries it exactly once
//! after a token refresh, and `depaginate`, which walks a list endpoint
//! page by page on top of it.
//!
//! Request flow:
//! 1. An accessor builds an `ApiRequest` (or a `PageQuery` for lists)
//! 2. `Executor::execute()` sends it with fresh headers from the `TokenStore`
//! 3. On 401/500 (and not in local mode) the store refreshes once and the
//!    same request is sent once more
//! 4. The caller checks the final status with `ApiResponse::error_for_status()`
//! 5. `depaginate()` repeats steps 1-4 with `p = 0, 1, ...` until a page
//!    comes back empty or the limit is reached

pub mod depaginate;
pub mod error;
pub mod executor;
pub mod metrics;
pub mod request;
pub mod response;
pub mod sieve;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use depaginate::{DEFAULT_PAGE_SIZE, PageQuery, depaginate};
pub use error::{Error, Result};
pub use executor::{Executor, HeaderInjection};
pub use request::ApiRequest;
pub use response::{ApiResponse, StatusClass, classify_status};
pub use sieve::Sieve;
