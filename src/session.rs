use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use crate::documents::LoadedDocument;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Ai,
}

impl ChatRole {
    /// Speaker label used when the transcript is rendered into a prompt.
    pub fn prompt_label(&self) -> &'static str {
        match self {
            ChatRole::User => "Human",
            ChatRole::Ai => "AI",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatEntry {
    pub role: ChatRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Ordered, append-only list of chat turns.
#[derive(Debug, Clone, Default)]
pub struct ChatHistory {
    entries: Vec<ChatEntry>,
}

impl ChatHistory {
    pub fn push_user(&mut self, content: impl Into<String>) {
        self.push(ChatRole::User, content.into());
    }

    pub fn push_ai(&mut self, content: impl Into<String>) {
        self.push(ChatRole::Ai, content.into());
    }

    fn push(&mut self, role: ChatRole, content: String) {
        self.entries.push(ChatEntry {
            role,
            content,
            created_at: Utc::now(),
        });
    }

    pub fn entries(&self) -> &[ChatEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `Human: ...` / `AI: ...` lines for the first `upto` entries.
    pub fn render_transcript(&self, upto: usize) -> String {
        self.entries
            .iter()
            .take(upto)
            .map(|entry| format!("{}: {}", entry.role.prompt_label(), entry.content))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Default)]
pub struct Session {
    pub document: Option<LoadedDocument>,
    pub history: ChatHistory,
}

/// The single interactive session of this process.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<Session>>,
    send_gate: Arc<Mutex<()>>,
}

impl SessionStore {
    /// Wait for the turn to send. Sends run one at a time, in arrival order,
    /// so each answer lands right after its own question. The session lock
    /// itself is not held, so reads and uploads go through meanwhile.
    pub async fn begin_send(&self) -> OwnedMutexGuard<()> {
        self.send_gate.clone().lock_owned().await
    }

    /// Swap in a freshly uploaded document. The transcript is kept.
    pub async fn replace_document(&self, document: LoadedDocument) {
        let mut guard = self.inner.write().await;
        guard.document = Some(document);
    }

    pub async fn document(&self) -> Option<LoadedDocument> {
        let guard = self.inner.read().await;
        guard.document.clone()
    }

    pub async fn history(&self) -> ChatHistory {
        let guard = self.inner.read().await;
        guard.history.clone()
    }

    /// Append the user's question and return the transcript as it stood
    /// before the question, together with the question's position.
    pub async fn record_user(&self, question: &str) -> (ChatHistory, usize) {
        let mut guard = self.inner.write().await;
        let position = guard.history.len();
        guard.history.push_user(question);
        (guard.history.clone(), position)
    }

    pub async fn record_ai(&self, answer: &str) -> ChatHistory {
        let mut guard = self.inner.write().await;
        guard.history.push_ai(answer);
        guard.history.clone()
    }
}
