//! Route handlers for the ingest server

use super::error_response::success_response;
use super::state::AppState;
use crate::error::{Result, ToHttpStatus};
use crate::extraction::ExtractionReport;
use crate::request::{ReportHeaders, read_body};
use axum::{
    Json,
    body::Body,
    extract::{Request, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::{debug, info, warn};

/// POST <endpoint> - Receive one gzip-compressed crash report
///
/// Headers are validated before a single body byte is read, so a foreign client is
/// refused without buffering its upload. The response is a bare `200 OK` once every
/// announced file is on disk, or an empty error status otherwise.
pub async fn receive_crash_report(State(state): State<AppState>, request: Request) -> Response {
    let (parts, body) = request.into_parts();
    match ingest(&state, &parts.headers, body).await {
        Ok(report) => {
            info!(
                directory = ?report.directory,
                files = report.files.len(),
                "accepted crash report"
            );
            success_response()
        }
        Err(e) => {
            warn!(
                error_code = e.error_code(),
                error = %e,
                "rejected crash report"
            );
            e.into_response()
        }
    }
}

async fn ingest(state: &AppState, headers: &HeaderMap, body: Body) -> Result<ExtractionReport> {
    let request = ReportHeaders::from_headers(headers, &state.config.ingest)?;
    let body = read_body(headers, body, state.config.server.max_body_bytes).await?;
    debug!(body_bytes = body.len(), "received crash report body");

    let report = state
        .extractor
        .extract_in_worker(body, request.file_count.get(), request.session_id)
        .await?;
    Ok(report)
}

/// GET /health - Health check
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
