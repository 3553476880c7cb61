// Type definitions and enums

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum LLMProvider {
    Google,
    OpenAI,
}

impl LLMProvider {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "google" | "gemini" => Some(LLMProvider::Google),
            "openai" => Some(LLMProvider::OpenAI),
            _ => None,
        }
    }
}

impl std::fmt::Display for LLMProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LLMProvider::Google => write!(f, "google"),
            LLMProvider::OpenAI => write!(f, "openai"),
        }
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LLMRequest {
    pub model: String,
    pub messages: Vec<LLMMessage>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub system_instruction: Option<String>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LLMMessage {
    pub role: String, // "user", "assistant", "system"
    pub content: String,
}

impl LLMMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new("assistant", content)
    }

    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self::new("system", content)
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LLMResponse {
    pub content: String,
    pub finish_reason: String,
    pub usage: TokenUsage,
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("LLM API error: {0}")]
    LLMApi(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Could not extract document text: {0}")]
    Extraction(String),

    #[error("Unsupported file type: {0}")]
    UnsupportedMedia(String),

    #[error("Upload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::LLMApi(_) => StatusCode::BAD_GATEWAY,
            AppError::Config(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Extraction(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::UnsupportedMedia(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Message shown to the browser. Request errors carry their own text so the
    /// page can display it as a warning verbatim.
    fn client_message(&self) -> String {
        match self {
            AppError::InvalidRequest(m) | AppError::NotFound(m) | AppError::Conflict(m) => m.clone(),
            AppError::LLMApi(m) => format!("Error while generating answer: {}", m),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(status = %status, error = %self, "Request failed");
        }
        let body = serde_json::json!({ "error": self.client_message() });
        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_parse() {
        assert_eq!(LLMProvider::parse("google"), Some(LLMProvider::Google));
        assert_eq!(LLMProvider::parse(" Gemini "), Some(LLMProvider::Google));
        assert_eq!(LLMProvider::parse("OpenAI"), Some(LLMProvider::OpenAI));
        assert_eq!(LLMProvider::parse("glm"), None);
        assert_eq!(LLMProvider::Google.to_string(), "google");
    }

    #[test]
    fn test_error_status_codes() {
        assert_eq!(AppError::InvalidRequest("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::Conflict("x".into()).status_code(), StatusCode::CONFLICT);
        assert_eq!(AppError::UnsupportedMedia("x".into()).status_code(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(AppError::Extraction("x".into()).status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(AppError::LLMApi("x".into()).status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_llm_error_message_is_prefixed() {
        let err = AppError::LLMApi("quota exceeded".into());
        assert_eq!(err.client_message(), "Error while generating answer: quota exceeded");

        let warning = AppError::InvalidRequest("Please enter a question.".into());
        assert_eq!(warning.client_message(), "Please enter a question.");
    }
}
