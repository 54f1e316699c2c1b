use axum::{
    extract::{Path, State},
    routing::post,
    Json, Router,
};
use agentdesk_core::test_call::{TestCallParams, TestCallResponse, STATUS_INITIATED};
use bytes::Bytes;
use tracing::info;

use super::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/agents/{id}/test-call", post(start_test_call))
}

/// Pretends to dial the number. Every call is reported as initiated,
/// whatever the body holds.
async fn start_test_call(
    State(_state): State<AppState>,
    Path(agent_id): Path<String>,
    body: Bytes,
) -> Json<TestCallResponse> {
    let call_id = uuid::Uuid::new_v4().to_string();
    match serde_json::from_slice::<TestCallParams>(&body) {
        Ok(params) => info!(
            "test call {call_id}: agent {agent_id} -> {} {} ({})",
            params.first_name, params.last_name, params.phone_number
        ),
        Err(_) => info!("test call {call_id}: agent {agent_id} ({} byte body)", body.len()),
    }
    Json(TestCallResponse {
        success: true,
        call_id,
        agent_id,
        status: STATUS_INITIATED.into(),
    })
}
