//! API Routes
//!
//! - `/` - Chat page
//! - `/api/document` - Upload (POST) and inspect (GET) the session document
//! - `/api/chat` - Ask a question about the document
//! - `/api/chat/history` - Full transcript
//! - `/api/health` - Health check

pub mod chat;
pub mod documents;
pub mod health;
pub mod ui;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::middleware::apply_cors;
use crate::models::AppState;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    info!("Creating application router");

    let max_upload_bytes = state.config.server.max_upload_bytes;
    let allowed_origins = state.config.server.cors_allowed_origins.clone();

    let router = Router::new()
        .merge(documents::router(state.clone()))
        .merge(chat::router(state.clone()))
        .merge(health::router(state))
        .merge(ui::router())
        .layer(DefaultBodyLimit::max(max_upload_bytes));

    apply_cors(router, &allowed_origins).layer(TraceLayer::new_for_http())
}
