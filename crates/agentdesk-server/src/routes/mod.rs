pub mod agents;
pub mod attachments;
pub mod catalog;
pub mod health;
pub mod test_calls;
pub mod uploads;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::http::{header, Method, StatusCode};
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};

use crate::proxy::{self, Upstream};
use crate::store::MemoryStore;

pub struct InnerAppState {
    /// Base used when handing out signed upload URLs.
    pub public_url: String,
    /// When set, requests the mock does not answer itself are forwarded here.
    pub upstream: Option<Upstream>,
    pub store: Mutex<MemoryStore>,
    /// Bytes received per upload key.
    pub uploads: Mutex<HashMap<String, usize>>,
}

pub type AppState = Arc<InnerAppState>;

impl InnerAppState {
    pub fn new(public_url: &str, upstream: Option<Upstream>, store: MemoryStore) -> AppState {
        Arc::new(Self {
            public_url: public_url.trim_end_matches('/').to_string(),
            upstream,
            store: Mutex::new(store),
            uploads: Mutex::new(HashMap::new()),
        })
    }

    pub fn store(&self) -> MutexGuard<'_, MemoryStore> {
        self.store.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn uploaded_size(&self, key: &str) -> Option<usize> {
        self.uploads
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .copied()
    }
}

pub fn build_router(state: AppState) -> Router {
    let mock = Router::new()
        .merge(health::routes())
        .merge(uploads::routes())
        .merge(test_calls::routes());

    let app = if state.upstream.is_some() {
        mock.fallback(proxy::forward)
    } else {
        mock.merge(catalog::routes())
            .merge(agents::routes())
            .merge(attachments::routes())
            .fallback(not_found)
    };

    app.layer(cors()).with_state(state)
}

fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

pub(crate) fn error_body(status: StatusCode, msg: impl Into<String>) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "error": msg.into() })))
}

async fn not_found() -> (StatusCode, Json<Value>) {
    error_body(StatusCode::NOT_FOUND, "Not found")
}

#[cfg(test)]
pub(crate) mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use axum::response::Response;
    use tower::ServiceExt;

    use super::*;

    pub(crate) fn test_state() -> AppState {
        InnerAppState::new("http://mock.test", None, MemoryStore::seeded())
    }

    pub(crate) async fn body_json(resp: Response) -> Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    pub(crate) fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn health_is_ok() {
        let app = build_router(test_state());
        let resp = app
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            body_json(resp).await,
            json!({ "status": "ok", "backend": "memory" })
        );
    }

    #[tokio::test]
    async fn unknown_path_is_json_404() {
        let app = build_router(test_state());
        let resp = app
            .oneshot(Request::get("/api/nothing").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert!(body_json(resp).await["error"].is_string());
    }

    #[tokio::test]
    async fn preflight_allows_any_origin() {
        let app = build_router(test_state());
        let req = Request::builder()
            .method("OPTIONS")
            .uri("/api/agents")
            .header("origin", "http://localhost:5173")
            .header("access-control-request-method", "PUT")
            .header("access-control-request-headers", "content-type")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let headers = resp.headers();
        assert_eq!(headers["access-control-allow-origin"], "*");
        let methods = headers["access-control-allow-methods"].to_str().unwrap();
        assert!(methods.contains("PUT"));
        assert!(methods.contains("DELETE"));
    }

    #[tokio::test]
    async fn simple_request_carries_cors_header() {
        let app = build_router(test_state());
        let req = Request::get("/api/languages")
            .header("origin", "http://localhost:5173")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.headers()["access-control-allow-origin"], "*");
    }
}
