//! Report and export handlers

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Deserialize;

use crate::{AppError, AppState, CurrentUser};
use smartfinance_core::{export::CSV_FILE_NAME, ExportFormat, Report, ReportFilter};

/// Query parameters shared by the report endpoints
#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    /// Category name, or `all`
    pub category: Option<String>,
    /// `income`, `expense`, or `all`
    #[serde(alias = "type")]
    pub transaction_type: Option<String>,
    /// Export format (default: csv)
    pub format: Option<String>,
}

impl ReportQuery {
    fn filter(&self) -> Result<ReportFilter, AppError> {
        Ok(ReportFilter::from_params(
            self.start_date.as_deref(),
            self.end_date.as_deref(),
            self.category.as_deref(),
            self.transaction_type.as_deref(),
        )?)
    }
}

/// GET /api/reports - Filtered rows with totals
pub async fn get_report(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Query(params): Query<ReportQuery>,
) -> Result<Json<Report>, AppError> {
    let filter = params.filter()?;
    Ok(Json(state.db.report(user.id, &filter)?))
}

/// GET /api/reports/export - Download the filtered report as CSV or JSON
pub async fn export_report(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Query(params): Query<ReportQuery>,
) -> Result<Response, AppError> {
    let format: ExportFormat = match params.format.as_deref().map(str::trim) {
        None | Some("") => ExportFormat::default(),
        Some(f) => f.parse().map_err(|e: String| AppError::bad_request(&e))?,
    };
    let filter = params.filter()?;
    let report = state.db.report(user.id, &filter)?;
    let body = report.export(format)?;

    let response = match format {
        ExportFormat::Csv => (
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename={}", CSV_FILE_NAME),
                ),
            ],
            body,
        )
            .into_response(),
        ExportFormat::Json => (
            [(header::CONTENT_TYPE, "application/json".to_string())],
            body,
        )
            .into_response(),
    };
    Ok(response)
}
