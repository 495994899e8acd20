//! Budget handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};

use crate::{today, AppError, AppState, CurrentUser, SuccessResponse};
use smartfinance_core::{
    models::BudgetWithProgress,
    validate::{BudgetInput, BudgetUpdateInput},
};

/// GET /api/budgets - Every budget with its progress for the current period
pub async fn list_budgets(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<Vec<BudgetWithProgress>>, AppError> {
    let budgets = state
        .db
        .list_budgets_with_progress(user.id, today(), &state.settings.budgets)?;
    Ok(Json(budgets))
}

/// POST /api/budgets
pub async fn create_budget(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(input): Json<BudgetInput>,
) -> Result<(StatusCode, Json<BudgetWithProgress>), AppError> {
    let budget = state.db.create_budget(user.id, &input.validate()?)?;
    let with_progress = state
        .db
        .budget_with_progress(budget, today(), &state.settings.budgets)?;
    Ok((StatusCode::CREATED, Json(with_progress)))
}

/// GET /api/budgets/:id
pub async fn get_budget(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<Json<BudgetWithProgress>, AppError> {
    let budget = state
        .db
        .get_budget(user.id, id)?
        .ok_or_else(|| AppError::not_found("Not found"))?;
    let with_progress = state
        .db
        .budget_with_progress(budget, today(), &state.settings.budgets)?;
    Ok(Json(with_progress))
}

/// PUT /api/budgets/:id - Change limit and period
pub async fn update_budget(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(input): Json<BudgetUpdateInput>,
) -> Result<Json<BudgetWithProgress>, AppError> {
    let (amount, period) = input.validate()?;
    let budget = state.db.update_budget(user.id, id, amount, period)?;
    let with_progress = state
        .db
        .budget_with_progress(budget, today(), &state.settings.budgets)?;
    Ok(Json(with_progress))
}

/// DELETE /api/budgets/:id
pub async fn delete_budget(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.db.delete_budget(user.id, id)?;
    Ok(Json(SuccessResponse { success: true }))
}
