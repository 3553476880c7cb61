use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use tracing::info;

use crate::agents::DocumentQaAgent;
use crate::models::{AppState, ChatRequest, ChatResponse, HistoryResponse};
use crate::types::AppResult;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/chat", post(post_chat))
        .route("/api/chat/history", get(get_history))
        .with_state(state)
}

pub async fn post_chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> AppResult<Json<ChatResponse>> {
    info!(question_len = request.question.len(), "Received chat question");

    let turn = DocumentQaAgent::ask(&state.session, &state.llm, &state.config.llm, &request.question).await?;

    Ok(Json(ChatResponse {
        answer: turn.answer,
        history: turn.history.entries().to_vec(),
    }))
}

async fn get_history(State(state): State<AppState>) -> Json<HistoryResponse> {
    Json(state.session.history().await.into())
}
