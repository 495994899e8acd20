//! Insight handlers

use std::sync::Arc;

use axum::{extract::State, Extension, Json};

use crate::{today, AppError, AppState, CurrentUser};
use smartfinance_core::{insight_report, InsightReport};

/// GET /api/insights - Rule-based insights plus the AI summary
///
/// The summary falls back to a fixed message when no AI backend answers.
pub async fn get_insights(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<InsightReport>, AppError> {
    let report = insight_report(
        &state.db,
        user.id,
        today(),
        &state.settings,
        state.ai.as_ref(),
    )
    .await?;
    Ok(Json(report))
}
