//! Statement import handler

use std::sync::Arc;

use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{today, AppError, AppState, CurrentUser};
use smartfinance_core::{models::Transaction, parse_statement_text, StatementLine};

/// Request body for statement import
#[derive(Debug, Deserialize)]
pub struct ImportRequest {
    /// Plain text extracted from a bank statement
    pub text: String,
    /// Store the parsed lines; otherwise only preview them
    #[serde(default)]
    pub commit: bool,
}

#[derive(Serialize)]
pub struct ImportResponse {
    pub lines: Vec<StatementLine>,
    pub imported: Vec<Transaction>,
}

/// POST /api/import/statement - Parse statement text, optionally storing the result
pub async fn import_statement(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<ImportRequest>,
) -> Result<Json<ImportResponse>, AppError> {
    if req.text.trim().is_empty() {
        return Err(AppError::bad_request("Statement text is required"));
    }

    let lines = parse_statement_text(&req.text, today())?;
    let imported = if req.commit {
        state.db.import_statement_lines(user.id, &lines)?
    } else {
        Vec::new()
    };
    info!(
        user_id = user.id,
        parsed = lines.len(),
        imported = imported.len(),
        "Statement import"
    );

    Ok(Json(ImportResponse { lines, imported }))
}
