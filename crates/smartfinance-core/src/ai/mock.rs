//! Mock backend for testing
//!
//! Useful for unit tests and development without a running LLM server.

use async_trait::async_trait;

use crate::error::{Error, Result};

use super::AIBackend;

/// Mock AI backend for testing
#[derive(Clone, Default)]
pub struct MockBackend {
    /// Whether health_check should return true
    pub healthy: bool,
    /// Fixed text returned by `summarize`; `None` uses a canned summary
    pub response: Option<String>,
    /// When set, `summarize` fails
    pub fail: bool,
}

impl MockBackend {
    /// Create a new mock backend (healthy by default)
    pub fn new() -> Self {
        Self {
            healthy: true,
            response: None,
            fail: false,
        }
    }

    /// Create an unhealthy mock backend whose calls fail
    pub fn unhealthy() -> Self {
        Self {
            healthy: false,
            response: None,
            fail: true,
        }
    }

    /// Create a mock that always answers with `text`
    pub fn with_response(text: &str) -> Self {
        Self {
            response: Some(text.to_string()),
            ..Self::new()
        }
    }
}

#[async_trait]
impl AIBackend for MockBackend {
    async fn summarize(&self, prompt: &str) -> Result<String> {
        if self.fail {
            return Err(Error::Ai("mock backend unavailable".to_string()));
        }
        if let Some(text) = &self.response {
            return Ok(text.clone());
        }
        let lines = prompt.lines().filter(|l| !l.trim().is_empty()).count();
        Ok(format!(
            "Your finances look steady. Reviewed {} lines of activity.",
            lines
        ))
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}
