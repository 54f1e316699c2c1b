use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use agentdesk_core::agent::Agent;
use serde_json::Value;
use tracing::info;

use super::{error_body, AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/agents", get(list_agents).post(create_agent))
        .route("/api/agents/{id}", get(get_agent).put(update_agent))
}

async fn list_agents(State(state): State<AppState>) -> Json<Vec<Agent>> {
    let agents = state.store().agents.clone();
    Json(agents)
}

async fn get_agent(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Agent>, (StatusCode, Json<Value>)> {
    let agent = state.store().agent(&id).cloned();
    agent.map(Json).ok_or_else(|| missing(&id))
}

async fn create_agent(
    State(state): State<AppState>,
    Json(input): Json<Agent>,
) -> (StatusCode, Json<Agent>) {
    let agent = state.store().insert_agent(input);
    info!(
        "created agent {} ({})",
        agent.id.as_deref().unwrap_or_default(),
        agent.name
    );
    (StatusCode::CREATED, Json(agent))
}

async fn update_agent(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<Agent>,
) -> Result<Json<Agent>, (StatusCode, Json<Value>)> {
    let agent = state.store().replace_agent(&id, input);
    agent.map(Json).ok_or_else(|| missing(&id))
}

fn missing(id: &str) -> (StatusCode, Json<Value>) {
    error_body(StatusCode::NOT_FOUND, format!("Agent not found: {id}"))
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
    async fn create_then_get_and_update() {
        let state = test_state();

        let resp = build_router(state.clone())
            .oneshot(json_request(
                "POST",
                "/api/agents",
                &json!({ "name": "Sales bot", "callType": "outbound", "speed": 120 }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created = body_json(resp).await;
        let id = created["id"].as_str().unwrap().to_string();
        assert_eq!(created["callType"], "outbound");

        let resp = build_router(state.clone())
            .oneshot(json_request(
                "PUT",
                &format!("/api/agents/{id}"),
                &json!({ "name": "Renamed", "callType": "inbound" }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["id"], id.as_str());

        let resp = build_router(state.clone())
            .oneshot(
                Request::get(format!("/api/agents/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(body_json(resp).await["name"], "Renamed");

        let resp = build_router(state)
            .oneshot(Request::get("/api/agents").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(body_json(resp).await.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_unknown_agent_is_404() {
        let resp = build_router(test_state())
            .oneshot(json_request("PUT", "/api/agents/ghost", &json!({ "name": "x" })))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(resp).await["error"], "Agent not found: ghost");
    }

    #[tokio::test]
    async fn get_unknown_agent_is_404() {
        let resp = build_router(test_state())
            .oneshot(Request::get("/api/agents/ghost").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
