use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use agentdesk_core::attachment::{Attachment, RegisterAttachment};
use tracing::info;

use super::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/attachments", get(list_attachments).post(register_attachment))
}

async fn list_attachments(State(state): State<AppState>) -> Json<Vec<Attachment>> {
    let attachments = state.store().attachments.clone();
    Json(attachments)
}

async fn register_attachment(
    State(state): State<AppState>,
    Json(input): Json<RegisterAttachment>,
) -> (StatusCode, Json<Attachment>) {
    let attachment = state.store().insert_attachment(Attachment {
        id: String::new(),
        key: input.key,
        file_name: input.file_name,
        file_size: input.file_size,
        mime_type: input.mime_type,
    });
    info!(
        "registered attachment {} for {}",
        attachment.id, attachment.file_name
    );
    (StatusCode::CREATED, Json(attachment))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::json;
    use tower::ServiceExt;

    use super::super::build_router;
    use super::super::tests::{body_json, json_request, test_state};
    use super::*;

    #[tokio::test]
    async fn register_assigns_id_and_lists() {
        let state = test_state();
        let resp = build_router(state.clone())
            .oneshot(json_request(
                "POST",
                "/api/attachments",
                &json!({
                    "key": "k-1",
                    "fileName": "notes.pdf",
                    "fileSize": 2048,
                    "mimeType": "application/pdf"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body = body_json(resp).await;
        assert!(!body["id"].as_str().unwrap().is_empty());
        assert_eq!(body["fileName"], "notes.pdf");

        let resp = build_router(state)
            .oneshot(Request::get("/api/attachments").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let list = body_json(resp).await;
        assert_eq!(list[0]["key"], "k-1");
    }

    #[tokio::test]
    async fn register_rejects_incomplete_body() {
        let resp = build_router(test_state())
            .oneshot(json_request("POST", "/api/attachments", &json!({ "key": "k" })))
            .await
            .unwrap();
        assert!(resp.status().is_client_error());
    }
}
