//! Passthrough to a real backend for every request the mock does not answer.

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{header, HeaderMap, HeaderName, StatusCode};
use axum::response::{IntoResponse, Response};
use tracing::{debug, warn};

use crate::routes::{error_body, AppState};

const HOP_BY_HOP: &[HeaderName] = &[
    header::CONNECTION,
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

#[derive(Clone)]
pub struct Upstream {
    client: reqwest::Client,
    base_url: String,
}

impl Upstream {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Strip headers that describe the hop rather than the message.
fn forwardable(headers: &HeaderMap) -> HeaderMap {
    let mut out = headers.clone();
    for name in HOP_BY_HOP {
        out.remove(name);
    }
    out.remove(header::HOST);
    out.remove(header::CONTENT_LENGTH);
    out
}

pub async fn forward(State(state): State<AppState>, req: Request) -> Response {
    let Some(upstream) = &state.upstream else {
        return error_body(StatusCode::NOT_FOUND, "Not found").into_response();
    };

    let (parts, body) = req.into_parts();
    let path = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let url = format!("{}{path}", upstream.base_url);

    let body = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            return error_body(StatusCode::BAD_REQUEST, format!("Failed to read body: {e}"))
                .into_response()
        }
    };

    debug!("proxy {} {url}", parts.method);
    let result = upstream
        .client
        .request(parts.method, &url)
        .headers(forwardable(&parts.headers))
        .body(body)
        .send()
        .await;

    let resp = match result {
        Ok(resp) => resp,
        Err(e) => {
            warn!("upstream request to {url} failed: {e}");
            return error_body(StatusCode::BAD_GATEWAY, format!("Upstream unreachable: {e}"))
                .into_response();
        }
    };

    let status = resp.status();
    let headers = forwardable(resp.headers());
    let bytes = match resp.bytes().await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("upstream body from {url} failed: {e}");
            return error_body(StatusCode::BAD_GATEWAY, format!("Upstream body error: {e}"))
                .into_response();
        }
    };

    let mut out = Response::new(Body::from(bytes));
    *out.status_mut() = status;
    *out.headers_mut() = headers;
    out
}
