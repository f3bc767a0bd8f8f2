//! Queue client
//!
//! `NeuvueQueue` owns one `Executor` and is the receiver of every resource
//! accessor (see the per-resource modules). All accessors take `&mut self`:
//! a token refresh may happen inside any call.

use std::time::Duration;

use queue_auth::{AuthOptions, CodePrompt, TokenStore};
use queue_client::{
    ApiRequest, ApiResponse, DEFAULT_PAGE_SIZE, Error, Executor, HeaderInjection, PageQuery,
    Result, Sieve, depaginate,
};
use serde_json::Value;
use tracing::info;

use crate::datatype::Datatype;
use crate::table::Table;

/// Common knobs of list accessors.
#[derive(Debug, Clone)]
pub struct ListOptions {
    pub sieve: Sieve,
    /// Maximum number of records; `None` or 0 returns everything.
    pub limit: Option<usize>,
    /// Field to sort by; a leading `-` sorts descending.
    pub sort: Option<String>,
    /// Value of `active` when the sieve does not mention it.
    pub active_default: bool,
    /// Overrides the client's page size for this call.
    pub page_size: Option<usize>,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            sieve: Sieve::new(),
            limit: None,
            sort: None,
            active_default: true,
            page_size: None,
        }
    }
}

impl ListOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sieve(mut self, sieve: Sieve) -> Self {
        self.sieve = sieve;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    pub fn active_default(mut self, active_default: bool) -> Self {
        self.active_default = active_default;
        self
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size);
        self
    }
}

/// Client for one NeuVue queue deployment.
#[derive(Debug)]
pub struct NeuvueQueue {
    executor: Executor,
    page_size: usize,
}

impl NeuvueQueue {
    /// Resolve credentials without prompting and build a client.
    ///
    /// Fails with an `Auth` error when no credential source is usable; see
    /// `login` for the interactive path.
    ///
    /// `options.timeout` bounds every request, including the refresh a
    /// file-backed store performs on startup.
    pub async fn connect(options: AuthOptions) -> Result<Self> {
        let http = build_http_client(options.timeout)?;
        let base_url = options.base_url.clone();
        let timeout = options.timeout;
        let tokens = TokenStore::initialize(http.clone(), options).await?;
        info!(
            url = %base_url,
            source = tokens.source().label(),
            "queue client ready"
        );
        Ok(Self::with_store(http, base_url, tokens, timeout))
    }

    /// Log in interactively, persist the new tokens and build a client.
    pub async fn login(options: AuthOptions, prompt: &mut dyn CodePrompt) -> Result<Self> {
        let http = build_http_client(options.timeout)?;
        let base_url = options.base_url.clone();
        let timeout = options.timeout;
        let tokens = TokenStore::login(http.clone(), options, prompt).await?;
        Ok(Self::with_store(http, base_url, tokens, timeout))
    }

    fn with_store(
        http: reqwest::Client,
        base_url: String,
        tokens: TokenStore,
        timeout: Option<Duration>,
    ) -> Self {
        let mut executor = Executor::new(http, base_url, tokens);
        if let Some(timeout) = timeout {
            executor = executor.with_timeout(timeout);
        }
        Self::from_executor(executor)
    }

    pub fn from_executor(executor: Executor) -> Self {
        Self {
            executor,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_headers(mut self, headers: &[HeaderInjection]) -> Self {
        self.executor = self.executor.with_headers(headers);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.executor = self.executor.with_timeout(timeout);
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    /// Fully qualified URL for `suffix`.
    pub fn url(&self, suffix: &str) -> String {
        self.executor.url(suffix)
    }

    /// Send one request and require a 2xx answer.
    pub(crate) async fn send(
        &mut self,
        request: ApiRequest,
        context: impl FnOnce() -> String,
    ) -> Result<ApiResponse> {
        self.executor
            .execute(&request)
            .await
            .and_then(ApiResponse::error_for_status)
            .map_err(|e| e.context(context()))
    }

    /// `send`, then decode the body as JSON.
    pub(crate) async fn send_json(
        &mut self,
        request: ApiRequest,
        context: impl FnOnce() -> String,
    ) -> Result<Value> {
        self.executor
            .execute(&request)
            .await
            .and_then(ApiResponse::error_for_status)
            .and_then(|response| response.json())
            .map_err(|e| e.context(context()))
    }

    /// Page query for `datatype` with the active default applied.
    pub(crate) fn page_query(&self, datatype: Datatype, options: ListOptions) -> PageQuery {
        PageQuery::new(datatype.path())
            .with_sieve(options.sieve.with_active_default(options.active_default))
            .with_sort(options.sort)
            .with_limit(options.limit)
            .with_page_size(options.page_size.unwrap_or(self.page_size))
    }

    /// Depaginate `query` and tabulate the result.
    pub(crate) async fn list(
        &mut self,
        datatype: Datatype,
        query: PageQuery,
        context: &str,
    ) -> Result<Table> {
        let records = depaginate(&mut self.executor, &query)
            .await
            .map_err(|e| e.context(context))?;
        Table::from_records(datatype, records).map_err(|e| e.context(context))
    }

    /// Depaginate `query` without tabulating.
    pub(crate) async fn list_raw(&mut self, query: PageQuery, context: &str) -> Result<Vec<Value>> {
        depaginate(&mut self.executor, &query)
            .await
            .map_err(|e| e.context(context))
    }
}

fn build_http_client(timeout: Option<Duration>) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder
        .build()
        .map_err(|e| Error::Transport(format!("building HTTP client: {e}")))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use axum::http::StatusCode;
    use queue_client::testing::{MockBackend, inline_executor, local_executor};
    use serde_json::json;

    pub(crate) async fn client_for(backend: &MockBackend) -> NeuvueQueue {
        NeuvueQueue::from_executor(inline_executor(backend).await)
    }

    pub(crate) async fn local_client_for(backend: &MockBackend) -> NeuvueQueue {
        NeuvueQueue::from_executor(local_executor(backend).await)
    }

    #[tokio::test]
    async fn list_options_inject_active_default() {
        let backend = MockBackend::start(|_, _| (StatusCode::OK, json!([]))).await;
        let client = client_for(&backend).await;

        let query = client.page_query(Datatype::Point, ListOptions::new());
        assert_eq!(query.sieve.get("active"), Some(&json!(true)));
        assert_eq!(query.page_size, DEFAULT_PAGE_SIZE);

        let query = client.page_query(
            Datatype::Point,
            ListOptions::new().active_default(false).page_size(10),
        );
        assert_eq!(query.sieve.get("active"), Some(&json!(false)));
        assert_eq!(query.page_size, 10);

        let query = client.page_query(
            Datatype::Point,
            ListOptions::new()
                .sieve(Sieve::new().with("active", json!({"$in": [true, false]})))
                .active_default(true),
        );
        assert_eq!(query.sieve.get("active"), Some(&json!({"$in": [true, false]})));
    }

    #[tokio::test]
    async fn client_page_size_applies_to_lists() {
        let backend = MockBackend::start(|_, _| (StatusCode::OK, json!([]))).await;
        let mut client = client_for(&backend).await.with_page_size(250);

        client.get_points(ListOptions::new()).await.unwrap();
        assert_eq!(backend.requests()[0].query["pageSize"], "250");
    }

    #[tokio::test]
    async fn send_json_wraps_status_errors_once() {
        let backend =
            MockBackend::start(|_, _| (StatusCode::NOT_FOUND, json!({"message": "no such task"})))
                .await;
        let mut client = client_for(&backend).await;

        let err = client
            .send_json(ApiRequest::get("/tasks/t9"), || "unable to get task t9".into())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "unable to get task t9");
        assert_eq!(err.status(), Some(404));
        let Error::Request { source, .. } = err else {
            panic!("expected Request");
        };
        assert_eq!(source.to_string(), "queue returned 404: no such task");
    }

    #[tokio::test]
    async fn local_client_sends_no_authorization() {
        let backend = MockBackend::start(|_, _| (StatusCode::OK, json!({"_id": "p"}))).await;
        let mut client = local_client_for(&backend).await;

        client.get_point("p").await.unwrap();
        assert!(backend.requests()[0].authorization.is_none());
    }

    /// Queue whose token endpoint answers only after `delay` and whose
    /// resources reject every token.
    async fn start_slow_token_backend(delay: Duration) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let app = axum::Router::new()
            .route(
                queue_auth::TOKEN_PATH,
                axum::routing::post(move || async move {
                    tokio::time::sleep(delay).await;
                    axum::Json(json!({"access_token": "at_late"}))
                }),
            )
            .fallback(|| async {
                (
                    StatusCode::UNAUTHORIZED,
                    axum::Json(json!({"message": "jwt expired"})),
                )
            });
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        url
    }

    #[tokio::test]
    async fn timeout_bounds_refresh_after_rejection() {
        let url = start_slow_token_backend(Duration::from_secs(3)).await;
        let mut client = NeuvueQueue::connect(
            AuthOptions::new(url)
                .with_tokens("at_1", "rt_1")
                .with_timeout(Duration::from_millis(200)),
        )
        .await
        .unwrap();

        let started = std::time::Instant::now();
        let err = client.get_points(ListOptions::new()).await.unwrap_err();
        assert!(
            started.elapsed() < Duration::from_secs(2),
            "refresh ran for {:?}",
            started.elapsed()
        );

        let Error::Request { source, .. } = err else {
            panic!("expected Request");
        };
        let Error::Depagination { source, .. } = *source else {
            panic!("expected Depagination");
        };
        assert!(
            matches!(*source, Error::Auth(queue_auth::Error::Http(_))),
            "got: {source:?}"
        );
        assert_eq!(client.executor().token_store().current_access_token(), Some("at_1"));
    }

    #[tokio::test]
    async fn timeout_bounds_startup_refresh_of_file_credentials() {
        let url = start_slow_token_backend(Duration::from_secs(3)).await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("neuvuequeue.cfg");
        queue_auth::credentials::save(&path, &queue_auth::TokenPair::new("at_stale", "rt_file"))
            .await
            .unwrap();

        let started = std::time::Instant::now();
        let err = NeuvueQueue::connect(
            AuthOptions::new(url)
                .with_credentials_path(&path)
                .with_timeout(Duration::from_millis(200)),
        )
        .await
        .unwrap_err();

        assert!(
            started.elapsed() < Duration::from_secs(2),
            "startup refresh ran for {:?}",
            started.elapsed()
        );
        assert!(
            matches!(err, Error::Auth(queue_auth::Error::Http(_))),
            "got: {err:?}"
        );
    }
}
