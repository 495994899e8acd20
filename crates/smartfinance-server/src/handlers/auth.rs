//! Authentication-related handlers

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{bearer_token, AppError, AppState, CurrentUser, SuccessResponse};
use smartfinance_core::models::User;

/// Request body for registration
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Request body for login
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// A fresh session token and the user it belongs to
#[derive(Serialize)]
pub struct SessionResponse {
    pub token: String,
    pub user: User,
}

/// Response for the /api/me endpoint
#[derive(Serialize)]
pub struct MeResponse {
    pub id: i64,
    pub username: String,
}

/// POST /api/auth/register - Create an account and log it in
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), AppError> {
    let username = req.username.trim();
    let email = req.email.trim();
    if username.is_empty() || email.is_empty() || req.password.is_empty() {
        return Err(AppError::bad_request(
            "Username, email and password are required",
        ));
    }

    let user = state.db.create_user(username, email, &req.password)?;
    let token = state.db.issue_token(user.id)?;
    info!(user_id = user.id, "Registered user");

    Ok((StatusCode::CREATED, Json(SessionResponse { token, user })))
}

/// POST /api/auth/login - Exchange credentials for a session token
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let user = state.db.authenticate(req.username.trim(), &req.password)?;
    let token = state.db.issue_token(user.id)?;
    Ok(Json(SessionResponse { token, user }))
}

/// POST /api/auth/logout - Revoke the presented token
pub async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<SuccessResponse>, AppError> {
    let revoked = match bearer_token(&headers) {
        Some(token) => state.db.revoke_token(token)?,
        None => false,
    };
    Ok(Json(SuccessResponse { success: revoked }))
}

/// GET /api/me - The authenticated user
pub async fn get_me(Extension(user): Extension<CurrentUser>) -> Json<MeResponse> {
    Json(MeResponse {
        id: user.id,
        username: user.username,
    })
}
