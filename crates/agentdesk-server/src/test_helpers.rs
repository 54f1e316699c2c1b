use axum::Router;
use tokio::net::TcpListener;

use crate::store::MemoryStore;
use crate::{build_router, AppState, InnerAppState, Upstream};

/// A running test server with base_url and background task handle.
pub struct TestServer {
    /// e.g. "http://127.0.0.1:12345"
    pub base_url: String,
    pub state: AppState,
    _handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    /// Base URL an `HttpService` should be pointed at.
    pub fn api_url(&self) -> String {
        format!("{}/api", self.base_url)
    }
}

/// Spawn the mock on a random port. Signed upload URLs point back at it.
pub async fn spawn_test_server() -> TestServer {
    spawn_with(None).await
}

/// Spawn the mock with every unhandled request forwarded to `upstream_url`.
pub async fn spawn_proxy_server(upstream_url: &str) -> TestServer {
    spawn_with(Some(Upstream::new(upstream_url))).await
}

/// Serve an arbitrary router on a random port and return its base URL.
pub async fn spawn_router(app: Router) -> (String, tokio::task::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), handle)
}

async fn spawn_with(upstream: Option<Upstream>) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{addr}");
    let state = InnerAppState::new(&base_url, upstream, MemoryStore::seeded());
    let app = build_router(state.clone());
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    TestServer {
        base_url,
        state,
        _handle: handle,
    }
}
