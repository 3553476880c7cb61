use axum::{extract::State, routing::get, Json, Router};

use crate::models::{AppState, HealthResponse};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .with_state(state)
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let document_loaded = state.session.document().await.is_some();
    let history_len = state.session.history().await.len();

    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        provider: state.llm.provider_name().to_string(),
        model: state.config.llm.model.clone(),
        document_loaded,
        history_len,
    })
}
