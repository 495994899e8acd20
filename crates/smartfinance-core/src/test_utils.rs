//! Test utilities for smartfinance-core
//!
//! A mock Ollama server for development and integration tests, plus small
//! fixture builders.

use std::net::SocketAddr;

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use crate::models::{Transaction, TransactionType};

/// Build an in-memory transaction fixture; `date` is `YYYY-MM-DD`
pub fn tx(
    user_id: i64,
    transaction_type: TransactionType,
    category: &str,
    amount: f64,
    date: &str,
) -> Transaction {
    Transaction {
        id: 0,
        user_id,
        transaction_type,
        category: category.to_string(),
        amount,
        description: None,
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        created_at: Utc::now(),
    }
}

/// How the mock answers `/api/generate`
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Echo a canned summary that mentions the prompt's first line
    Summary,
    /// Always answer with this text
    Fixed(String),
    /// Answer with HTTP 500
    Fail,
}

/// Mock Ollama server for testing and development
pub struct MockOllamaServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockOllamaServer {
    /// Start the mock server on an available port
    pub async fn start() -> Self {
        Self::start_with(MockBehavior::Summary).await
    }

    /// Start the mock server with a specific behavior
    pub async fn start_with(behavior: MockBehavior) -> Self {
        let app = Router::new()
            .route("/api/tags", get(handle_tags))
            .route("/api/generate", post(handle_generate))
            .with_state(behavior);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockOllamaServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Ollama tags endpoint response (health check)
async fn handle_tags() -> Json<TagsResponse> {
    Json(TagsResponse {
        models: vec![ModelInfo {
            name: "llama3.2:latest".to_string(),
            size: 4_000_000_000,
        }],
    })
}

/// Ollama generate endpoint
async fn handle_generate(
    State(behavior): State<MockBehavior>,
    Json(request): Json<GenerateRequest>,
) -> Response {
    let response = match behavior {
        MockBehavior::Fail => {
            return (StatusCode::INTERNAL_SERVER_ERROR, "model crashed").into_response()
        }
        MockBehavior::Fixed(text) => text,
        MockBehavior::Summary => {
            let first = request.prompt.lines().next().unwrap_or_default();
            format!("Summary for: {}", first.trim())
        }
    };

    Json(GenerateResponse {
        model: request.model,
        response,
        done: true,
    })
    .into_response()
}

#[derive(Debug, Serialize)]
struct TagsResponse {
    models: Vec<ModelInfo>,
}

#[derive(Debug, Serialize)]
struct ModelInfo {
    name: String,
    size: u64,
}

#[derive(Debug, Deserialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    #[allow(dead_code)]
    stream: bool,
}

#[derive(Debug, Serialize)]
struct GenerateResponse {
    model: String,
    response: String,
    done: bool,
}
