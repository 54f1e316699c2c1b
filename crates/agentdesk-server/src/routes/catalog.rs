use axum::{extract::State, routing::get, Json, Router};
use agentdesk_core::reference::{Language, Model, Prompt, Voice};

use super::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/languages", get(list_languages))
        .route("/api/voices", get(list_voices))
        .route("/api/prompts", get(list_prompts))
        .route("/api/models", get(list_models))
}

async fn list_languages(State(state): State<AppState>) -> Json<Vec<Language>> {
    let languages = state.store().languages.clone();
    Json(languages)
}

async fn list_voices(State(state): State<AppState>) -> Json<Vec<Voice>> {
    let voices = state.store().voices.clone();
    Json(voices)
}

async fn list_prompts(State(state): State<AppState>) -> Json<Vec<Prompt>> {
    let prompts = state.store().prompts.clone();
    Json(prompts)
}

async fn list_models(State(state): State<AppState>) -> Json<Vec<Model>> {
    let models = state.store().models.clone();
    Json(models)
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    use super::super::build_router;
    use super::super::tests::{body_json, test_state};

    #[tokio::test]
    async fn lists_come_from_the_store() {
        let state = test_state();
        let expected = {
            let store = state.store();
            [
                ("/api/languages", store.languages.len()),
                ("/api/voices", store.voices.len()),
                ("/api/prompts", store.prompts.len()),
                ("/api/models", store.models.len()),
            ]
        };
        for (path, expected) in expected {
            let resp = build_router(state.clone())
                .oneshot(Request::get(path).body(Body::empty()).unwrap())
                .await
                .unwrap();
            let body = body_json(resp).await;
            assert_eq!(body.as_array().unwrap().len(), expected, "{path}");
        }
    }
}
