use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::config::LLMConfig;
use crate::types::{AppError, AppResult, LLMProvider, LLMRequest, LLMResponse};

#[async_trait]
pub trait LLMAdapter: Send + Sync {
    async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse>;
}

pub struct LLM {
    adapter: Box<dyn LLMAdapter>,
    provider_name: String,
}

impl LLM {
    /// Build the adapter named by `LLM_PROVIDER`. An unknown provider or a
    /// missing key is a configuration error.
    pub fn from_config(config: &LLMConfig) -> AppResult<Self> {
        let provider = LLMProvider::parse(&config.provider).ok_or_else(|| {
            AppError::Config(format!(
                "Unsupported provider: {} (expected google or openai)",
                config.provider
            ))
        })?;

        let api_key = config.active_api_key().ok_or_else(|| {
            let var = match provider {
                LLMProvider::Google => "GOOGLE_API_KEY",
                LLMProvider::OpenAI => "OPENAI_API_KEY",
            };
            AppError::Config(format!("{} must be set for provider {}", var, provider))
        })?;

        let client = http_client(config.timeout_secs)?;
        let adapter: Box<dyn LLMAdapter> = match provider {
            LLMProvider::Google => Box::new(crate::llm::google::GoogleAdapter::with_client(
                client,
                &api_key,
                &config.google_base_url,
            )),
            LLMProvider::OpenAI => Box::new(crate::llm::openai::OpenAIAdapter::with_client(
                client,
                &api_key,
                &config.openai_base_url,
            )),
        };

        Ok(Self {
            adapter,
            provider_name: provider.to_string(),
        })
    }

    pub fn with_adapter(provider_name: impl Into<String>, adapter: Box<dyn LLMAdapter>) -> Self {
        Self {
            adapter,
            provider_name: provider_name.into(),
        }
    }

    pub fn provider_name(&self) -> &str {
        &self.provider_name
    }

    pub async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse> {
        self.adapter.create_chat_completion(request).await
    }
}

pub(crate) fn http_client(timeout_secs: u64) -> AppResult<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| AppError::Config(format!("Failed to create HTTP client: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_from_config_requires_key() {
        let config = Config::default();
        let err = LLM::from_config(&config.llm).err().unwrap();
        assert!(err.to_string().contains("GOOGLE_API_KEY"));
    }

    #[test]
    fn test_from_config_rejects_unknown_provider() {
        let mut config = Config::default();
        config.llm.provider = "groq".to_string();
        config.llm.google_api_key = "key".to_string();
        let err = LLM::from_config(&config.llm).err().unwrap();
        assert!(matches!(err, AppError::Config(_)));
        assert!(err.to_string().contains("groq"));
    }

    #[test]
    fn test_from_config_selects_provider() {
        let mut config = Config::default();
        config.llm.google_api_key = "g-key".to_string();
        let llm = LLM::from_config(&config.llm).unwrap();
        assert_eq!(llm.provider_name(), "google");

        config.llm.provider = "openai".to_string();
        config.llm.openai_api_key = "sk-key".to_string();
        let llm = LLM::from_config(&config.llm).unwrap();
        assert_eq!(llm.provider_name(), "openai");
    }
}
