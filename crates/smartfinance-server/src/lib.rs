//! SmartFinance Web Server
//!
//! Axum-based REST API for the SmartFinance personal finance tracker.
//!
//! Security features:
//! - Bearer token authentication on everything except register and login
//! - Every handler threads the authenticated user id into the core
//! - Restrictive CORS policy
//! - Sanitized error responses

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Serialize;
use tower_http::{
    cors::CorsLayer, services::ServeDir, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};
use tracing::{debug, error, info, warn};

use smartfinance_core::{AIBackend, AIClient, Database, Settings};

mod handlers;

/// Maximum transactions returned by one list call
pub const MAX_PAGE_LIMIT: i64 = 1000;

/// Environment variable holding comma-separated CORS origins
pub const ALLOWED_ORIGINS_ENV: &str = "SMARTFINANCE_ALLOWED_ORIGINS";

/// Routes reachable without a token
const PUBLIC_PATHS: [&str; 2] = ["/api/auth/register", "/api/auth/login"];

/// Server configuration
#[derive(Clone, Default)]
pub struct ServerConfig {
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
}

impl ServerConfig {
    /// Read `SMARTFINANCE_ALLOWED_ORIGINS`
    pub fn from_env() -> Self {
        let allowed_origins = std::env::var(ALLOWED_ORIGINS_ENV)
            .map(|v| parse_origins(&v))
            .unwrap_or_default();
        Self { allowed_origins }
    }
}

/// Split a comma-separated origin list, dropping blanks
pub fn parse_origins(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Shared application state
pub struct AppState {
    pub db: Database,
    pub settings: Settings,
    pub ai: Option<AIClient>,
}

/// The user a bearer token resolved to, inserted by the auth middleware
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
}

/// Extract the token from `Authorization: Bearer <token>`
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Authentication middleware - resolves the bearer token to a [`CurrentUser`]
async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    if !path.starts_with("/api/") || PUBLIC_PATHS.contains(&path.as_str()) {
        return next.run(request).await;
    }

    let Some(token) = bearer_token(request.headers()) else {
        debug!(path = %path, "Missing bearer token");
        return AppError::unauthorized("Authentication required").into_response();
    };

    match state.db.user_for_token(token) {
        Ok(Some(user)) => {
            request.extensions_mut().insert(CurrentUser {
                id: user.id,
                username: user.username,
            });
            next.run(request).await
        }
        Ok(None) => {
            warn!(path = %path, "Rejected unknown bearer token");
            AppError::unauthorized("Invalid or expired token").into_response()
        }
        Err(e) => AppError::from(e).into_response(),
    }
}

/// The date all "as of today" computations use
pub(crate) fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Generic success response
#[derive(Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Create the router, reading AI configuration from the environment
pub fn create_router(
    db: Database,
    static_dir: Option<&str>,
    config: ServerConfig,
    settings: Settings,
) -> Router {
    let ai = AIClient::from_env_with_settings(&settings.ai);
    create_router_with_options(db, static_dir, config, settings, ai)
}

/// Create the router with an explicit AI client
pub fn create_router_with_options(
    db: Database,
    static_dir: Option<&str>,
    config: ServerConfig,
    settings: Settings,
    ai: Option<AIClient>,
) -> Router {
    let state = Arc::new(AppState {
        db,
        settings,
        ai,
    });

    let api_routes = Router::new()
        // Auth
        .route("/auth/register", post(handlers::register))
        .route("/auth/login", post(handlers::login))
        .route("/auth/logout", post(handlers::logout))
        .route("/me", get(handlers::get_me))
        // Dashboard
        .route("/dashboard", get(handlers::get_dashboard))
        // Transactions
        .route(
            "/transactions",
            get(handlers::list_transactions).post(handlers::create_transaction),
        )
        .route(
            "/transactions/:id",
            get(handlers::get_transaction)
                .put(handlers::update_transaction)
                .delete(handlers::delete_transaction),
        )
        // Budgets
        .route(
            "/budgets",
            get(handlers::list_budgets).post(handlers::create_budget),
        )
        .route(
            "/budgets/:id",
            get(handlers::get_budget)
                .put(handlers::update_budget)
                .delete(handlers::delete_budget),
        )
        // Recurring
        .route(
            "/recurring",
            get(handlers::list_recurring).post(handlers::create_recurring),
        )
        .route("/recurring/generate-due", post(handlers::generate_due))
        .route(
            "/recurring/:id",
            put(handlers::update_recurring).delete(handlers::delete_recurring),
        )
        .route("/recurring/:id/generate", post(handlers::generate_now))
        // Insights
        .route("/insights", get(handlers::get_insights))
        // Reports
        .route("/reports", get(handlers::get_report))
        .route("/reports/export", get(handlers::export_report))
        // Import
        .route("/import/statement", post(handlers::import_statement));

    let allowed_methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];

    // Build CORS layer
    let cors = if config.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        CorsLayer::new()
            .allow_methods(allowed_methods)
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(allowed_methods)
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    };

    let csp_value = HeaderValue::from_static(
        "default-src 'self'; script-src 'self'; style-src 'self' 'unsafe-inline'; img-src 'self' data:; connect-src 'self'; frame-ancestors 'none'",
    );

    let mut app = Router::new()
        .nest("/api", api_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            csp_value,
        ));

    // Serve static files if directory provided
    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app
}

/// Start the server
pub async fn serve(
    db: Database,
    host: &str,
    port: u16,
    static_dir: Option<&str>,
    settings: Settings,
) -> anyhow::Result<()> {
    serve_with_config(db, host, port, static_dir, ServerConfig::from_env(), settings).await
}

/// Start the server with custom configuration
pub async fn serve_with_config(
    db: Database,
    host: &str,
    port: u16,
    static_dir: Option<&str>,
    config: ServerConfig,
    settings: Settings,
) -> anyhow::Result<()> {
    let ai = AIClient::from_env_with_settings(&settings.ai);
    check_ai_connection(ai.as_ref()).await;

    let app = create_router_with_options(db, static_dir, config, settings, ai);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Check and log AI backend connection status
async fn check_ai_connection(ai: Option<&AIClient>) {
    match ai {
        Some(client) => {
            if client.health_check().await {
                info!(host = client.host(), model = client.model(), "AI backend connected");
            } else {
                warn!(
                    host = client.host(),
                    "AI backend configured but not responding; summaries will use the fallback text"
                );
            }
        }
        None => {
            info!("AI backend not configured (set OLLAMA_HOST to enable AI summaries)");
        }
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn unauthorized(msg: &str) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn conflict(msg: &str) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            message: msg.to_string(),
            internal: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        use smartfinance_core::Error as CoreError;

        let err = err.into();

        // Caller-facing core errors carry a message meant for the client
        match err.downcast_ref::<CoreError>() {
            Some(CoreError::Validation(msg)) => return Self::bad_request(msg),
            Some(CoreError::NotFound(_)) => return Self::not_found("Not found"),
            Some(CoreError::Conflict(msg)) => return Self::conflict(msg),
            Some(CoreError::Unauthorized(msg)) => return Self::unauthorized(msg),
            _ => {}
        }

        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Return generic message to client
            message: "An internal error occurred".to_string(),
            // Keep full error for logging
            internal: Some(err),
        }
    }
}

#[cfg(test)]
mod tests;
