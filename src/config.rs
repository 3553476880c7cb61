use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::str::FromStr;

use crate::types::LLMProvider;

pub const DEFAULT_GOOGLE_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub llm: LLMConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    /// When set, logs are also written to a daily rolling file here.
    pub dir: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub cors_allowed_origins: Vec<String>,
    pub max_upload_bytes: usize,
}

#[derive(Clone, Deserialize)]
pub struct LLMConfig {
    pub provider: String,
    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub timeout_secs: u64,
    pub google_api_key: String,
    pub google_base_url: String,
    pub openai_api_key: String,
    pub openai_base_url: String,
}

// Keys stay out of the startup log line.
impl std::fmt::Debug for LLMConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LLMConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timeout_secs", &self.timeout_secs)
            .field("google_api_key", &mask(&self.google_api_key))
            .field("google_base_url", &self.google_base_url)
            .field("openai_api_key", &mask(&self.openai_api_key))
            .field("openai_base_url", &self.openai_base_url)
            .finish()
    }
}

fn mask(key: &str) -> &'static str {
    if key.is_empty() {
        "<unset>"
    } else {
        "<set>"
    }
}

impl LLMConfig {
    /// API key for the configured provider, if one is set.
    pub fn active_api_key(&self) -> Option<String> {
        let key = match LLMProvider::parse(&self.provider)? {
            LLMProvider::Google => &self.google_api_key,
            LLMProvider::OpenAI => &self.openai_api_key,
        };
        if key.trim().is_empty() {
            None
        } else {
            Some(key.clone())
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                port: 3000,
                host: "127.0.0.1".to_string(),
                cors_allowed_origins: vec!["http://localhost:3000".to_string()],
                max_upload_bytes: 25 * 1024 * 1024,
            },
            llm: LLMConfig {
                provider: "google".to_string(),
                model: DEFAULT_MODEL.to_string(),
                temperature: None,
                max_tokens: None,
                timeout_secs: 120,
                google_api_key: String::new(),
                google_base_url: DEFAULT_GOOGLE_BASE_URL.to_string(),
                openai_api_key: String::new(),
                openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            },
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = Config::default();

        Ok(Self {
            server: ServerConfig {
                port: parse_var("PORT", defaults.server.port)?,
                host: env::var("HOST").unwrap_or(defaults.server.host),
                cors_allowed_origins: env::var("ALLOWED_ORIGINS")
                    .map(|origins| {
                        origins
                            .split(',')
                            .map(|s| s.trim().to_string())
                            .filter(|s| !s.is_empty())
                            .collect()
                    })
                    .unwrap_or(defaults.server.cors_allowed_origins),
                max_upload_bytes: parse_var("MAX_UPLOAD_BYTES", defaults.server.max_upload_bytes)?,
            },
            llm: LLMConfig {
                provider: env::var("LLM_PROVIDER").unwrap_or(defaults.llm.provider),
                model: env::var("LLM_MODEL").unwrap_or(defaults.llm.model),
                temperature: parse_optional_var("LLM_TEMPERATURE")?,
                max_tokens: parse_optional_var("LLM_MAX_TOKENS")?,
                timeout_secs: parse_var("LLM_TIMEOUT_SECS", defaults.llm.timeout_secs)?,
                google_api_key: env::var("GOOGLE_API_KEY").unwrap_or_default(),
                google_base_url: env::var("GOOGLE_BASE_URL").unwrap_or(defaults.llm.google_base_url),
                openai_api_key: env::var("OPENAI_API_KEY").unwrap_or_default(),
                openai_base_url: env::var("OPENAI_BASE_URL").unwrap_or(defaults.llm.openai_base_url),
            },
            logging: LoggingConfig {
                dir: env::var("LOG_DIR").ok().filter(|d| !d.trim().is_empty()),
            },
        })
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value: {:?}", name, raw)),
        Err(_) => Ok(default),
    }
}

fn parse_optional_var<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("{} has an invalid value: {:?}", name, raw)),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_api_key_follows_provider() {
        let mut config = Config::default();
        assert_eq!(config.llm.active_api_key(), None);

        config.llm.google_api_key = "g-key".to_string();
        config.llm.openai_api_key = "sk-key".to_string();
        assert_eq!(config.llm.active_api_key(), Some("g-key".to_string()));

        config.llm.provider = "openai".to_string();
        assert_eq!(config.llm.active_api_key(), Some("sk-key".to_string()));

        config.llm.provider = "unknown".to_string();
        assert_eq!(config.llm.active_api_key(), None);
    }

    #[test]
    fn test_debug_hides_keys() {
        let mut config = Config::default();
        config.llm.google_api_key = "super-secret".to_string();
        let printed = format!("{:?}", config);
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("<set>"));
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.llm.model, "gemini-1.5-flash");
        assert_eq!(config.llm.provider, "google");
        assert_eq!(config.server.port, 3000);
    }
}
