//! Transaction handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;

use crate::{AppError, AppState, CurrentUser, SuccessResponse, MAX_PAGE_LIMIT};
use smartfinance_core::{models::Transaction, validate::TransactionInput};

/// Query parameters for listing transactions
#[derive(Debug, Deserialize)]
pub struct TransactionQuery {
    /// Most recent N rows; all rows when absent
    pub limit: Option<i64>,
}

/// GET /api/transactions - Newest first
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Query(params): Query<TransactionQuery>,
) -> Result<Json<Vec<Transaction>>, AppError> {
    let limit = params.limit.map(|l| l.clamp(1, MAX_PAGE_LIMIT));
    Ok(Json(state.db.list_transactions(user.id, limit)?))
}

/// POST /api/transactions
pub async fn create_transaction(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(input): Json<TransactionInput>,
) -> Result<(StatusCode, Json<Transaction>), AppError> {
    let tx = input.validate()?;
    let created = state.db.create_transaction(user.id, &tx)?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/transactions/:id
pub async fn get_transaction(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<Json<Transaction>, AppError> {
    let tx = state
        .db
        .get_transaction(user.id, id)?
        .ok_or_else(|| AppError::not_found("Not found"))?;
    Ok(Json(tx))
}

/// PUT /api/transactions/:id
pub async fn update_transaction(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(input): Json<TransactionInput>,
) -> Result<Json<Transaction>, AppError> {
    let tx = input.validate()?;
    Ok(Json(state.db.update_transaction(user.id, id, &tx)?))
}

/// DELETE /api/transactions/:id
pub async fn delete_transaction(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.db.delete_transaction(user.id, id)?;
    Ok(Json(SuccessResponse { success: true }))
}
