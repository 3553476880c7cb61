//! Document Q&A Agent
//!
//! Answers a question about the loaded document. The whole document text
//! goes into the prompt together with the transcript so far; there is no
//! retrieval or chunking step.

use tracing::{error, info};

use crate::config::LLMConfig;
use crate::llm::provider::LLM;
use crate::session::{ChatHistory, SessionStore};
use crate::types::{AppError, AppResult, LLMMessage, LLMRequest};

pub const EMPTY_QUESTION_WARNING: &str = "Please enter a question.";
pub const NO_DOCUMENT_MESSAGE: &str = "Upload a PDF or DOCX document with readable text before asking questions.";

const PROMPT_TEMPLATE: &str = "You are a helpful assistant. Use the following document context and conversation history to answer the user's question.\n\n\
Context:\n{context}\n\n\
Conversation History:\n{history}\n\n\
Question:\n{question}";

/// Result of one successful send.
#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub answer: String,
    pub history: ChatHistory,
}

pub struct DocumentQaAgent;

impl DocumentQaAgent {
    /// Fill the prompt template.
    pub fn build_prompt(context: &str, history: &str, question: &str) -> String {
        // Single pass so that braces inside the document are left alone.
        let mut prompt = String::with_capacity(PROMPT_TEMPLATE.len() + context.len() + history.len() + question.len());
        let mut rest = PROMPT_TEMPLATE;
        while let Some(start) = rest.find('{') {
            prompt.push_str(&rest[..start]);
            let tail = &rest[start..];
            let (value, consumed) = if tail.starts_with("{context}") {
                (context, "{context}".len())
            } else if tail.starts_with("{history}") {
                (history, "{history}".len())
            } else if tail.starts_with("{question}") {
                (question, "{question}".len())
            } else {
                ("{", 1)
            };
            prompt.push_str(value);
            rest = &tail[consumed..];
        }
        prompt.push_str(rest);
        prompt
    }

    /// One model call for one question. No retry.
    pub async fn answer(
        llm: &LLM,
        config: &LLMConfig,
        document_text: &str,
        history: &str,
        question: &str,
    ) -> AppResult<String> {
        let prompt = Self::build_prompt(document_text, history, question);
        info!(
            provider = %llm.provider_name(),
            model = %config.model,
            prompt_len = prompt.len(),
            "Generating answer"
        );

        let request = LLMRequest {
            model: config.model.clone(),
            messages: vec![LLMMessage::user(prompt)],
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            system_instruction: None,
        };

        let response = llm.create_chat_completion(&request).await?;
        info!(
            response_len = response.content.len(),
            finish_reason = %response.finish_reason,
            total_tokens = response.usage.total_tokens,
            "Answer generated"
        );
        Ok(response.content)
    }

    /// Handle a send from the chat box.
    ///
    /// The user entry is recorded before the model call; the AI entry only
    /// after it succeeds. A failed call leaves the user entry in place.
    /// Concurrent sends are queued so entries keep alternating.
    pub async fn ask(
        session: &SessionStore,
        llm: &LLM,
        config: &LLMConfig,
        question: &str,
    ) -> AppResult<ChatTurn> {
        if question.trim().is_empty() {
            return Err(AppError::InvalidRequest(EMPTY_QUESTION_WARNING.to_string()));
        }

        let _turn = session.begin_send().await;

        let document = session
            .document()
            .await
            .filter(|doc| doc.has_text())
            .ok_or_else(|| AppError::Conflict(NO_DOCUMENT_MESSAGE.to_string()))?;

        let (snapshot, position) = session.record_user(question).await;
        let transcript = snapshot.render_transcript(position);

        match Self::answer(llm, config, &document.text, &transcript, question).await {
            Ok(answer) => {
                let history = session.record_ai(&answer).await;
                Ok(ChatTurn { answer, history })
            }
            Err(e) => {
                error!(error = %e, document = %document.filename, "Answer generation failed");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use crate::llm::provider::{LLMAdapter, LLM};
    use crate::types::{AppError, AppResult, LLMRequest, LLMResponse, TokenUsage};

    /// Adapter that records requests and replies from a script.
    #[derive(Clone, Default)]
    pub struct ScriptedAdapter {
        pub requests: Arc<Mutex<Vec<LLMRequest>>>,
        pub replies: Arc<Mutex<Vec<AppResult<String>>>>,
    }

    impl ScriptedAdapter {
        pub fn replying(replies: Vec<AppResult<String>>) -> Self {
            let adapter = Self::default();
            *adapter.replies.lock().unwrap() = replies.into_iter().rev().collect();
            adapter
        }

        pub fn llm(&self) -> LLM {
            LLM::with_adapter("scripted", Box::new(self.clone()))
        }

        pub fn prompts(&self) -> Vec<String> {
            self.requests
                .lock()
                .unwrap()
                .iter()
                .map(|r| r.messages[0].content.clone())
                .collect()
        }
    }

    #[async_trait]
    impl LLMAdapter for ScriptedAdapter {
        async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse> {
            self.requests.lock().unwrap().push(request.clone());
            let reply = self
                .replies
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Err(AppError::LLMApi("no scripted reply".to_string())))?;
            Ok(LLMResponse {
                content: reply,
                finish_reason: "STOP".to_string(),
                usage: TokenUsage::default(),
            })
        }
    }
}
