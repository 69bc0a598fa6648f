//! Axum route handlers for the share and export actions.
//!
//! Both actions are local to their request: a failure here never disturbs a
//! report the caller already holds.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::export::document::build_document;
use crate::export::share::{share_uri, to_share_text, ShareChannel};
use crate::report::model::ReportModel;
use crate::state::AppState;

pub const EXPORT_FILENAME: &str = "Health_and_Safety_Report.docx";
const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(Debug, Deserialize)]
pub struct ShareRequest {
    pub report: ReportModel,
    pub channel: ShareChannel,
}

#[derive(Debug, Serialize)]
pub struct ShareResponse {
    pub uri: String,
}

/// POST /api/v1/reports/share
pub async fn handle_share(Json(request): Json<ShareRequest>) -> Json<ShareResponse> {
    let encoded = to_share_text(&request.report);
    Json(ShareResponse {
        uri: share_uri(request.channel, &encoded),
    })
}

#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    pub report: ReportModel,
}

/// POST /api/v1/reports/export
///
/// Builds the document structure and hands it to the render collaborator,
/// returning the binary blob under the fixed download filename.
pub async fn handle_export(
    State(state): State<AppState>,
    Json(request): Json<ExportRequest>,
) -> Result<impl IntoResponse, AppError> {
    let spec = build_document(&request.report);
    let blob = state.doc_writer.render(&spec).await?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, DOCX_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{EXPORT_FILENAME}\""),
            ),
        ],
        blob,
    ))
}
