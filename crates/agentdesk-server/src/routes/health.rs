use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use super::AppState;

#[derive(Serialize)]
struct Health {
    status: &'static str,
    /// "memory" for the built-in store, "upstream" when proxying.
    backend: &'static str,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/health", get(health))
}

async fn health(State(state): State<AppState>) -> Json<Health> {
    let backend = if state.upstream.is_some() {
        "upstream"
    } else {
        "memory"
    };
    Json(Health {
        status: "ok",
        backend,
    })
}
