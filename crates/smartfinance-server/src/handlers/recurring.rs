//! Recurring transaction handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Serialize;

use crate::{today, AppError, AppState, CurrentUser, SuccessResponse};
use smartfinance_core::{
    models::{RecurringTransaction, RecurringWithNext, Transaction},
    validate::{RecurringInput, RecurringUpdateInput},
};

/// Response for a catch-up run
#[derive(Serialize)]
pub struct GenerateDueResponse {
    pub count: usize,
    pub transactions: Vec<Transaction>,
}

/// GET /api/recurring - Rules with their next occurrence
pub async fn list_recurring(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<Vec<RecurringWithNext>>, AppError> {
    Ok(Json(state.db.list_recurring_with_next(user.id)?))
}

/// POST /api/recurring
pub async fn create_recurring(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(input): Json<RecurringInput>,
) -> Result<(StatusCode, Json<RecurringTransaction>), AppError> {
    let rule = state.db.create_recurring(user.id, &input.validate()?)?;
    Ok((StatusCode::CREATED, Json(rule)))
}

/// PUT /api/recurring/:id
///
/// The end date is checked against the stored start date, which cannot be edited.
pub async fn update_recurring(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(input): Json<RecurringUpdateInput>,
) -> Result<Json<RecurringTransaction>, AppError> {
    let rule = state
        .db
        .get_recurring(user.id, id)?
        .ok_or_else(|| AppError::not_found("Not found"))?;
    let update = input.validate(rule.start_date)?;
    Ok(Json(state.db.update_recurring(user.id, id, &update)?))
}

/// DELETE /api/recurring/:id - Generated transactions are kept
pub async fn delete_recurring(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.db.delete_recurring(user.id, id)?;
    Ok(Json(SuccessResponse { success: true }))
}

/// POST /api/recurring/:id/generate - Materialize the next occurrence now
pub async fn generate_now(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<(StatusCode, Json<Transaction>), AppError> {
    let tx = state.db.generate_now(user.id, id)?;
    Ok((StatusCode::CREATED, Json(tx)))
}

/// POST /api/recurring/generate-due - Catch up every rule to today
pub async fn generate_due(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<GenerateDueResponse>, AppError> {
    let transactions = state.db.generate_due(user.id, today())?;
    Ok(Json(GenerateDueResponse {
        count: transactions.len(),
        transactions,
    }))
}
