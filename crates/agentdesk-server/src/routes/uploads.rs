use axum::{
    extract::{DefaultBodyLimit, Path, State},
    routing::{post, put},
    Json, Router,
};
use agentdesk_core::attachment::{TransferReceipt, UploadSlot};
use bytes::Bytes;
use tracing::info;

use super::AppState;

/// Advisory lifetime of an issued upload URL, in seconds.
pub const SIGNED_URL_TTL_SECS: u64 = 3600;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/attachments/upload-url", post(issue_upload_url))
        // Upload bodies are unbounded in size.
        .route(
            "/upload/{key}",
            put(receive_upload).layer(DefaultBodyLimit::disable()),
        )
}

async fn issue_upload_url(State(state): State<AppState>) -> Json<UploadSlot> {
    let key = uuid::Uuid::new_v4().to_string();
    let signed_url = format!("{}/upload/{key}", state.public_url);
    Json(UploadSlot {
        key,
        signed_url,
        expires_in: SIGNED_URL_TTL_SECS,
    })
}

async fn receive_upload(
    State(state): State<AppState>,
    Path(key): Path<String>,
    body: Bytes,
) -> Json<TransferReceipt> {
    info!("received {} bytes for upload {key}", body.len());
    state
        .uploads
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .insert(key.clone(), body.len());
    Json(TransferReceipt {
        success: true,
        key,
        message: "File uploaded successfully".into(),
    })
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use super::super::build_router;
    use super::super::tests::{body_json, test_state};

    #[tokio::test]
    async fn upload_url_points_at_public_url() {
        let app = build_router(test_state());
        let resp = app
            .oneshot(
                Request::post("/api/attachments/upload-url")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        let key = body["key"].as_str().unwrap();
        assert!(uuid::Uuid::parse_str(key).is_ok());
        assert_eq!(
            body["signedUrl"],
            format!("http://mock.test/upload/{key}").as_str()
        );
        assert_eq!(body["expiresIn"], 3600);
    }

    #[tokio::test]
    async fn put_records_received_bytes() {
        let state = test_state();
        let app = build_router(state.clone());
        let resp = app
            .oneshot(
                Request::put("/upload/k-1")
                    .header("content-type", "application/octet-stream")
                    .body(Body::from("hello"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["key"], "k-1");
        assert_eq!(body["message"], "File uploaded successfully");
        assert_eq!(state.uploaded_size("k-1"), Some(5));
    }

    #[tokio::test]
    async fn put_accepts_files_over_default_body_limit() {
        let state = test_state();
        let content = vec![b'x'; 3 * 1024 * 1024];
        let resp = build_router(state.clone())
            .oneshot(
                Request::put("/upload/k-big")
                    .header("content-type", "application/octet-stream")
                    .body(Body::from(content))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(state.uploaded_size("k-big"), Some(3 * 1024 * 1024));
    }
}
