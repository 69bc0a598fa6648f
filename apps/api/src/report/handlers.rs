//! Axum route handlers for the report pipeline.

use axum::{extract::State, Json};

use crate::errors::AppError;
use crate::report::assembler::ReportAssembler;
use crate::report::model::{ReportModel, ReportRequest};
use crate::state::AppState;

/// POST /api/v1/reports
///
/// Runs one full generation cycle and returns the assembled report. The two
/// inputs must be non-empty — the same precondition the UI enforces by
/// disabling the submit action.
pub async fn handle_generate_report(
    State(state): State<AppState>,
    Json(request): Json<ReportRequest>,
) -> Result<Json<ReportModel>, AppError> {
    if request.type_of_work.trim().is_empty() {
        return Err(AppError::Validation(
            "type_of_work must not be empty".to_string(),
        ));
    }
    if request.role.trim().is_empty() {
        return Err(AppError::Validation("role must not be empty".to_string()));
    }

    let assembler = ReportAssembler::new(state.llm.clone());
    let model = assembler.assemble(&request).await?;
    Ok(Json(model))
}
