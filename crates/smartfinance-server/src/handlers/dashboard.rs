//! Dashboard handler

use std::sync::Arc;

use axum::{extract::State, Extension, Json};

use crate::{today, AppError, AppState, CurrentUser};
use smartfinance_core::Dashboard;

/// GET /api/dashboard - Totals, charts, recent activity and insights
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<Dashboard>, AppError> {
    let dash = smartfinance_core::dashboard(
        &state.db,
        user.id,
        today(),
        &state.settings,
        state.ai.as_ref(),
    )
    .await?;
    Ok(Json(dash))
}
