//! Pluggable local AI backend for the financial summary
//!
//! The summary is an optional collaborator: every caller must cope with
//! no backend being configured, and with the backend failing. See
//! [`crate::insights::generate_summary`] for the degrade path.
//!
//! # Architecture
//!
//! - `AIBackend` trait: the interface every backend implements
//! - `AIClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `OllamaBackend`, `MockBackend`
//!
//! # Configuration
//!
//! Environment variables:
//! - `AI_BACKEND`: Backend to use (ollama, mock). Default: ollama
//! - `OLLAMA_HOST`: Ollama server URL (required for ollama backend)
//! - `OLLAMA_MODEL`: Default model name (default: llama3.2)

mod mock;
mod ollama;

pub use mock::MockBackend;
pub use ollama::OllamaBackend;

use std::time::Duration;

use async_trait::async_trait;

use crate::config::AiSettings;
use crate::error::Result;

/// Trait defining the interface for all AI backends
#[async_trait]
pub trait AIBackend: Send + Sync {
    /// Generate free text for a prompt
    async fn summarize(&self, prompt: &str) -> Result<String>;

    /// Check if the backend is available
    async fn health_check(&self) -> bool;

    /// Get the model name
    fn model(&self) -> &str;

    /// Get the host URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete AI client enum
#[derive(Clone)]
pub enum AIClient {
    /// Ollama backend (HTTP API)
    Ollama(OllamaBackend),
    /// Mock backend for testing
    Mock(MockBackend),
}

impl AIClient {
    /// Create an AI client from environment variables
    ///
    /// Checks `AI_BACKEND` to determine which backend to use:
    /// - `ollama` (default): Uses OLLAMA_HOST and OLLAMA_MODEL
    /// - `mock`: Creates a mock backend for testing
    ///
    /// Returns None if the required environment variables are not set.
    pub fn from_env() -> Option<Self> {
        let backend = std::env::var("AI_BACKEND").unwrap_or_else(|_| "ollama".to_string());

        match backend.to_lowercase().as_str() {
            "ollama" => OllamaBackend::from_env().map(AIClient::Ollama),
            "mock" => Some(AIClient::Mock(MockBackend::new())),
            "none" | "off" => None,
            _ => {
                tracing::warn!(backend = %backend, "Unknown AI_BACKEND, falling back to ollama");
                OllamaBackend::from_env().map(AIClient::Ollama)
            }
        }
    }

    /// Like [`AIClient::from_env`], then applies the timeout and model
    /// override from the settings file
    pub fn from_env_with_settings(settings: &AiSettings) -> Option<Self> {
        let client = Self::from_env()?;
        let client = match &settings.model {
            Some(model) => client.with_model(model),
            None => client,
        };
        Some(client.with_timeout(settings.timeout))
    }

    /// Create an Ollama backend directly
    pub fn ollama(host: &str, model: &str) -> Self {
        AIClient::Ollama(OllamaBackend::new(host, model))
    }

    /// Create a mock backend for testing
    pub fn mock() -> Self {
        AIClient::Mock(MockBackend::new())
    }

    /// Create a new instance with a different model
    pub fn with_model(&self, model: &str) -> Self {
        match self {
            AIClient::Ollama(b) => AIClient::Ollama(b.with_model(model)),
            AIClient::Mock(b) => AIClient::Mock(b.clone()),
        }
    }

    /// Create a new instance with a request timeout
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        match self {
            AIClient::Ollama(b) => AIClient::Ollama(b.with_timeout(timeout)),
            AIClient::Mock(b) => AIClient::Mock(b.clone()),
        }
    }
}

#[async_trait]
impl AIBackend for AIClient {
    async fn summarize(&self, prompt: &str) -> Result<String> {
        match self {
            AIClient::Ollama(b) => b.summarize(prompt).await,
            AIClient::Mock(b) => b.summarize(prompt).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            AIClient::Ollama(b) => b.health_check().await,
            AIClient::Mock(b) => b.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            AIClient::Ollama(b) => b.model(),
            AIClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            AIClient::Ollama(b) => b.host(),
            AIClient::Mock(b) => b.host(),
        }
    }
}
