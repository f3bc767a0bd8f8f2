//! In-process mock queue for tests
//!
//! Binds an axum server on 127.0.0.1:0 that records every request and
//! answers through a caller-supplied closure. The token endpoint is served
//! separately and counts refresh calls, handing out `at_refreshed_{n}`.
//! Enabled for this crate's tests and, through the `test-support` feature,
//! for downstream crates.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::Json;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::extract::{Query, State};
use axum::http::{Request, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use queue_auth::{AuthOptions, TokenStore};
use serde_json::{Value, json};
use tokio::net::TcpListener;

use crate::executor::Executor;

/// One request as observed by the mock.
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub method: String,
    pub path: String,
    pub query: HashMap<String, String>,
    pub headers: HashMap<String, String>,
    pub authorization: Option<String>,
    pub body: Option<Value>,
}

impl SeenRequest {
    pub fn header(&self, name: &str) -> Option<String> {
        self.headers.get(name).cloned()
    }

    /// The `q` parameter decoded as JSON.
    pub fn sieve(&self) -> Option<Value> {
        self.query
            .get("q")
            .and_then(|q| serde_json::from_str(q).ok())
    }
}

/// Answers request number `index` (token calls excluded).
pub type Responder = Arc<dyn Fn(usize, &SeenRequest) -> (StatusCode, Value) + Send + Sync>;

#[derive(Clone)]
struct MockState {
    responder: Responder,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
    refreshes: Arc<AtomicUsize>,
    refresh_status: StatusCode,
}

/// Handle to a running mock queue.
pub struct MockBackend {
    pub url: String,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
    refreshes: Arc<AtomicUsize>,
}

impl MockBackend {
    /// Start a mock whose token endpoint always succeeds.
    pub async fn start<F>(responder: F) -> Self
    where
        F: Fn(usize, &SeenRequest) -> (StatusCode, Value) + Send + Sync + 'static,
    {
        Self::start_with_refresh_status(responder, StatusCode::OK).await
    }

    /// Start a mock whose token endpoint answers with `refresh_status`.
    pub async fn start_with_refresh_status<F>(responder: F, refresh_status: StatusCode) -> Self
    where
        F: Fn(usize, &SeenRequest) -> (StatusCode, Value) + Send + Sync + 'static,
    {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let refreshes = Arc::new(AtomicUsize::new(0));
        let state = MockState {
            responder: Arc::new(responder),
            seen: seen.clone(),
            refreshes: refreshes.clone(),
            refresh_status,
        };

        let app = Router::new()
            .route("/auth/tokens", post(token_handler))
            .fallback(queue_handler)
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("http://{addr}"),
            seen,
            refreshes,
        }
    }

    /// Every non-token request in arrival order.
    pub fn requests(&self) -> Vec<SeenRequest> {
        self.seen.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    pub fn refresh_count(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }
}

async fn token_handler(State(state): State<MockState>) -> impl IntoResponse {
    let n = state.refreshes.fetch_add(1, Ordering::SeqCst) + 1;
    if state.refresh_status.is_success() {
        (
            StatusCode::OK,
            Json(json!({ "access_token": format!("at_refreshed_{n}") })),
        )
    } else {
        (
            state.refresh_status,
            Json(json!({ "message": "refresh rejected" })),
        )
    }
}

async fn queue_handler(State(state): State<MockState>, request: Request<Body>) -> impl IntoResponse {
    let (parts, body) = request.into_parts();
    let query = Query::<HashMap<String, String>>::try_from_uri(&parts.uri)
        .map(|Query(q)| q)
        .unwrap_or_default();
    let headers: HashMap<String, String> = parts
        .headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();
    let bytes = to_bytes(body, usize::MAX).await.unwrap_or_default();

    let seen = SeenRequest {
        method: parts.method.to_string(),
        path: parts.uri.path().to_string(),
        query,
        authorization: headers.get("authorization").cloned(),
        headers,
        body: serde_json::from_slice(&bytes).ok(),
    };

    let index = {
        let mut log = state.seen.lock().unwrap();
        log.push(seen.clone());
        log.len() - 1
    };
    let (status, reply) = (state.responder)(index, &seen);
    (status, Json(reply))
}

/// Executor with inline tokens `at_1`/`rt_1` pointed at `backend`.
pub async fn inline_executor(backend: &MockBackend) -> Executor {
    let http = reqwest::Client::new();
    let tokens = TokenStore::initialize(
        http.clone(),
        AuthOptions::new(&backend.url).with_tokens("at_1", "rt_1"),
    )
    .await
    .unwrap();
    Executor::new(http, &backend.url, tokens)
}

/// Executor in local (no auth) mode pointed at `backend`.
pub async fn local_executor(backend: &MockBackend) -> Executor {
    let http = reqwest::Client::new();
    let tokens = TokenStore::initialize(http.clone(), AuthOptions::new(&backend.url).local(true))
        .await
        .unwrap();
    Executor::new(http, &backend.url, tokens)
}
