mod gemini;
mod ollama;
mod openai;

use async_trait::async_trait;
use std::time::Duration;

pub use gemini::GeminiProvider;
pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;

/// Result type for LLM operations
pub type LlmResult<T> = Result<T, LlmError>;

/// Errors that can occur during LLM operations
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("API request failed: {0}")]
    ApiError(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Response parsing failed: {0}")]
    ParseError(String),
}

/// Request to generate a piece of text
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    /// The prompt text
    pub prompt: String,
    /// Maximum response length in tokens (provider-dependent)
    pub max_tokens: Option<u32>,
    /// Timeout for the request
    pub timeout: Duration,
}

/// Response from an LLM provider
#[derive(Debug, Clone)]
pub struct GenerateResponse {
    /// The generated text
    pub text: String,
    pub metadata: ResponseMetadata,
}

/// Metadata about the LLM response
#[derive(Debug, Clone)]
pub struct ResponseMetadata {
    /// Name of the provider (e.g., "gemini", "openai", "ollama")
    pub provider: String,
    /// Model name used
    pub model: String,
    /// Tokens consumed (if available)
    pub tokens_used: Option<u32>,
    /// Latency in milliseconds
    pub latency_ms: u64,
}

/// Trait that all LLM providers must implement
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate text for the given prompt
    async fn generate(&self, request: GenerateRequest) -> LlmResult<GenerateResponse>;

    /// Get the name of this provider
    fn name(&self) -> &str;
}

/// Ordered set of providers; the first one that answers wins
pub struct LlmManager {
    pub providers: Vec<Box<dyn LlmProvider>>,
}

impl LlmManager {
    pub fn new(providers: Vec<Box<dyn LlmProvider>>) -> Self {
        Self { providers }
    }

    /// Try each provider in order and return the first successful response.
    /// If every provider fails, the last error is returned.
    pub async fn generate(&self, request: GenerateRequest) -> LlmResult<GenerateResponse> {
        let mut last_error =
            LlmError::ConfigError("No LLM providers configured".to_string());

        for provider in &self.providers {
            match provider.generate(request.clone()).await {
                Ok(response) => {
                    tracing::debug!(
                        provider = %response.metadata.provider,
                        model = %response.metadata.model,
                        tokens = ?response.metadata.tokens_used,
                        latency_ms = response.metadata.latency_ms,
                        "Generated text"
                    );
                    return Ok(response);
                }
                Err(e) => {
                    tracing::error!("Provider {} failed: {}", provider.name(), e);
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }
}

/// Configuration for LLM providers
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Gemini API key
    pub gemini_api_key: Option<String>,
    /// Gemini model to use
    pub gemini_model: String,
    /// OpenAI API key
    pub openai_api_key: Option<String>,
    /// OpenAI model to use
    pub openai_model: String,
    /// Ollama base URL (None = disabled)
    pub ollama_base_url: Option<String>,
    /// Ollama model to use
    pub ollama_model: String,
    /// Default timeout for LLM requests
    pub default_timeout: Duration,
    /// Default max tokens for responses
    pub default_max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            gemini_model: "gemini-1.5-flash".to_string(),
            openai_api_key: None,
            openai_model: "gpt-4o-mini".to_string(),
            ollama_base_url: None,
            ollama_model: "llama3.2".to_string(),
            default_timeout: Duration::from_secs(30),
            default_max_tokens: 80,
        }
    }
}

/// Read a non-empty, trimmed environment variable
fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

impl LlmConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            gemini_api_key: env_non_empty("GEMINI_API_KEY"),
            gemini_model: env_non_empty("GEMINI_MODEL").unwrap_or(defaults.gemini_model),
            openai_api_key: env_non_empty("OPENAI_API_KEY"),
            openai_model: env_non_empty("OPENAI_MODEL").unwrap_or(defaults.openai_model),
            ollama_base_url: env_non_empty("OLLAMA_BASE_URL"),
            ollama_model: env_non_empty("OLLAMA_MODEL").unwrap_or(defaults.ollama_model),
            default_timeout: std::env::var("LLM_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.default_timeout),
            default_max_tokens: std::env::var("LLM_MAX_TOKENS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.default_max_tokens),
        }
    }

    /// Build an LlmManager with all configured providers
    pub fn build_manager(&self) -> LlmResult<LlmManager> {
        let mut providers: Vec<Box<dyn LlmProvider>> = Vec::new();

        if let Some(api_key) = &self.gemini_api_key {
            providers.push(Box::new(GeminiProvider::new(
                api_key.clone(),
                self.gemini_model.clone(),
            )));
        }

        if let Some(api_key) = &self.openai_api_key {
            providers.push(Box::new(OpenAiProvider::new(
                api_key.clone(),
                self.openai_model.clone(),
            )));
        }

        if let Some(base_url) = &self.ollama_base_url {
            providers.push(Box::new(OllamaProvider::new(
                base_url.clone(),
                self.ollama_model.clone(),
            )));
        }

        if providers.is_empty() {
            return Err(LlmError::ConfigError(
                "No LLM providers configured. Set GEMINI_API_KEY, OPENAI_API_KEY or OLLAMA_BASE_URL"
                    .to_string(),
            ));
        }

        Ok(LlmManager::new(providers))
    }

    /// Request for a prompt using the configured limits
    pub fn request(&self, prompt: String) -> GenerateRequest {
        GenerateRequest {
            prompt,
            max_tokens: Some(self.default_max_tokens),
            timeout: self.default_timeout,
        }
    }
}
