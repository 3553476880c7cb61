// Docchat - ask questions about an uploaded PDF or DOCX document

pub mod agents;
pub mod cli;
pub mod config;
pub mod documents;
pub mod llm;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod session;
pub mod types;
pub mod utils;

// Re-exports for convenience
pub use config::Config;
pub use models::AppState;
pub use types::{AppError, AppResult};

pub fn create_router(state: AppState) -> axum::Router {
    routes::create_router(state)
}
