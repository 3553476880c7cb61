use std::sync::Arc;

use crate::config::Config;
use crate::documents::{DocumentKind, LoadedDocument};
use crate::llm::provider::LLM;
use crate::session::{ChatEntry, ChatHistory, SessionStore};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub session: SessionStore,
    pub llm: Arc<LLM>,
}

impl AppState {
    pub fn new(config: Config, llm: LLM) -> Self {
        Self {
            config,
            session: SessionStore::default(),
            llm: Arc::new(llm),
        }
    }
}

// API Request/Response types

#[derive(Debug, serde::Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub question: String,
}

#[derive(Debug, serde::Serialize)]
pub struct ChatResponse {
    pub answer: String,
    pub history: Vec<ChatEntry>,
}

#[derive(Debug, serde::Serialize)]
pub struct HistoryResponse {
    pub entries: Vec<ChatEntry>,
}

impl From<ChatHistory> for HistoryResponse {
    fn from(history: ChatHistory) -> Self {
        Self {
            entries: history.entries().to_vec(),
        }
    }
}

#[derive(Debug, serde::Serialize)]
pub struct DocumentInfo {
    pub id: uuid::Uuid,
    pub filename: String,
    pub kind: DocumentKind,
    pub mime_type: &'static str,
    pub size: usize,
    pub characters: usize,
    pub has_text: bool,
    pub uploaded_at: chrono::DateTime<chrono::Utc>,
}

impl From<&LoadedDocument> for DocumentInfo {
    fn from(doc: &LoadedDocument) -> Self {
        Self {
            id: doc.id,
            filename: doc.filename.clone(),
            kind: doc.kind,
            mime_type: doc.kind.mime_type(),
            size: doc.size,
            characters: doc.text.chars().count(),
            has_text: doc.has_text(),
            uploaded_at: doc.uploaded_at,
        }
    }
}

#[derive(Debug, serde::Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub provider: String,
    pub model: String,
    pub document_loaded: bool,
    pub history_len: usize,
}
