//! ============================================================================
//! AI Configuration - Explicit provider settings for the adapter
//! ============================================================================
//! Passed into `OpenAiClient::new` as a value so tests can substitute fakes
//! without process-wide mutation. `from_env` exists for binaries.
//! ============================================================================

/// Default provider base URL (OpenAI-compatible).
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default embedding model.
pub const DEFAULT_EMBED_MODEL: &str = "text-embedding-3-small";

/// Default chat-completion model.
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";

/// Provider configuration for the AI service adapter.
#[derive(Debug, Clone)]
pub struct AiConfig {
    /// Bearer credential. Empty means "not configured"; the adapter refuses
    /// to make network calls without one.
    pub api_key: String,
    pub base_url: String,
    pub embed_model: String,
    pub chat_model: String,
}

impl AiConfig {
    /// Create a configuration with the given credential and defaults for
    /// everything else.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            embed_model: DEFAULT_EMBED_MODEL.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
        }
    }

    /// Read configuration from the environment:
    /// `OPENAI_API_KEY`, optional `OPENAI_BASE_URL`,
    /// `SHOPDESK_EMBED_MODEL`, `SHOPDESK_CHAT_MODEL`.
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("OPENAI_API_KEY").unwrap_or_default(),
            base_url: std::env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            embed_model: std::env::var("SHOPDESK_EMBED_MODEL")
                .unwrap_or_else(|_| DEFAULT_EMBED_MODEL.to_string()),
            chat_model: std::env::var("SHOPDESK_CHAT_MODEL")
                .unwrap_or_else(|_| DEFAULT_CHAT_MODEL.to_string()),
        }
    }

    /// Override the base URL (self-hosted or compatible providers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_defaults() {
        let config = AiConfig::new("sk-test");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.embed_model, DEFAULT_EMBED_MODEL);
        assert_eq!(config.chat_model, DEFAULT_CHAT_MODEL);
        assert!(config.is_configured());
    }

    #[test]
    fn test_empty_key_is_not_configured() {
        assert!(!AiConfig::new("").is_configured());
    }

    #[test]
    fn test_with_base_url() {
        let config = AiConfig::new("sk-test").with_base_url("http://localhost:8080/v1");
        assert_eq!(config.base_url, "http://localhost:8080/v1");
    }
}
