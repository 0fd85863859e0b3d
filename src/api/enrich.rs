//! Enrichment workflow endpoints
//!
//! Upload → background pipeline → status poll → workbook download. The
//! uploaded workbook supplies the ISBN column; everything else in it is
//! ignored.

use crate::error::{ApiError, ApiResult};
use crate::events::EnrichEvent;
use crate::models::{EnrichmentSession, SessionState};
use crate::spreadsheet::{self, OUTPUT_FILE_NAME, OUTPUT_MIME};
use crate::AppState;
use axum::{
    extract::{Multipart, Path, State},
    http::header,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use futures::StreamExt;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct StartEnrichResponse {
    pub session_id: Uuid,
    pub total_isbns: usize,
    pub state: SessionState,
}

pub fn enrich_routes() -> Router<AppState> {
    Router::new()
        .route("/enrich", post(start_enrichment))
        .route("/enrich/status/:session_id", get(get_enrich_status))
        .route("/enrich/download/:session_id", get(download_workbook))
}

/// POST /enrich - accept an xlsx upload and start the pipeline
///
/// Expects a multipart field named `file` containing a workbook with an
/// `ISBN` column. Responds immediately with the session id; processing
/// continues in a background task.
async fn start_enrichment(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<StartEnrichResponse>> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart upload: {}", e)))?
    {
        if field.name() == Some("file") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {}", e)))?;
            upload = Some(bytes);
            break;
        }
    }

    let bytes = upload
        .ok_or_else(|| ApiError::BadRequest("Multipart field 'file' is required".to_string()))?;

    let isbns =
        spreadsheet::read_isbn_column(&bytes).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let session = EnrichmentSession::new(isbns.len());
    let response = StartEnrichResponse {
        session_id: session.session_id,
        total_isbns: isbns.len(),
        state: session.state,
    };

    let session_id = session.session_id;
    state
        .sessions
        .write()
        .await
        .insert(session_id, session);

    tracing::info!(
        session_id = %session_id,
        total_isbns = isbns.len(),
        "Enrichment session started"
    );

    let state_clone = state.clone();
    tokio::spawn(async move {
        tracing::info!(session_id = %session_id, "Background enrichment task started");
        execute_enrichment(state_clone, session_id, isbns).await;
        tracing::info!(session_id = %session_id, "Background enrichment task finished");
    });

    Ok(Json(response))
}

/// Run the pipeline for one session: fan out, update progress per
/// completion, export the workbook, finalize the session.
async fn execute_enrichment(state: AppState, session_id: Uuid, isbns: Vec<String>) {
    let started = std::time::Instant::now();
    let total = isbns.len();

    state.event_bus.emit_lossy(EnrichEvent::EnrichmentSessionStarted {
        session_id,
        total_isbns: total,
        timestamp: Utc::now(),
    });

    let mut results = Vec::with_capacity(total);
    {
        let stream = state.enricher.stream(isbns);
        futures::pin_mut!(stream);

        while let Some(record) = stream.next().await {
            results.push(record);
            let completed = results.len();

            let (fraction, message) = {
                let mut sessions = state.sessions.write().await;
                match sessions.get_mut(&session_id) {
                    Some(session) => {
                        session.update_progress(completed);
                        (session.progress.fraction, session.progress.message.clone())
                    }
                    None => (0.0, format!("Processed {}/{} ISBNs", completed, total)),
                }
            };

            state.event_bus.emit_lossy(EnrichEvent::EnrichmentProgress {
                session_id,
                completed,
                total,
                fraction,
                message,
                timestamp: Utc::now(),
            });
        }
    }

    match spreadsheet::write_workbook(&results) {
        Ok(workbook) => {
            // The row set is no longer needed once the export exists.
            drop(results);

            if let Some(session) = state.sessions.write().await.get_mut(&session_id) {
                session.complete(workbook);
            }

            state
                .event_bus
                .emit_lossy(EnrichEvent::EnrichmentSessionCompleted {
                    session_id,
                    total_isbns: total,
                    elapsed_seconds: started.elapsed().as_secs(),
                    timestamp: Utc::now(),
                });

            tracing::info!(
                session_id = %session_id,
                total_isbns = total,
                elapsed_seconds = started.elapsed().as_secs(),
                "Enrichment session completed"
            );
        }
        Err(e) => {
            if let Some(session) = state.sessions.write().await.get_mut(&session_id) {
                session.fail();
            }

            state
                .event_bus
                .emit_lossy(EnrichEvent::EnrichmentSessionFailed {
                    session_id,
                    error: e.to_string(),
                    timestamp: Utc::now(),
                });

            tracing::error!(
                session_id = %session_id,
                error = %e,
                "Workbook export failed"
            );
        }
    }
}

/// GET /enrich/status/{session_id} - poll session state and progress
async fn get_enrich_status(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<Json<EnrichmentSession>> {
    let sessions = state.sessions.read().await;
    let session = sessions.get(&session_id).ok_or_else(|| {
        ApiError::NotFound(format!("Enrichment session not found: {}", session_id))
    })?;

    tracing::debug!(session_id = %session_id, state = ?session.state, "Status query");

    Ok(Json(session.clone()))
}

/// GET /enrich/download/{session_id} - fetch the exported workbook
async fn download_workbook(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<Response> {
    let sessions = state.sessions.read().await;
    let session = sessions.get(&session_id).ok_or_else(|| {
        ApiError::NotFound(format!("Enrichment session not found: {}", session_id))
    })?;

    match session.state {
        SessionState::Completed => {}
        SessionState::Processing => {
            return Err(ApiError::Conflict(
                "Enrichment still in progress".to_string(),
            ))
        }
        SessionState::Failed => {
            return Err(ApiError::Conflict(
                "Enrichment failed; no workbook available".to_string(),
            ))
        }
    }

    let workbook = session.workbook.clone().ok_or_else(|| {
        ApiError::Internal("Completed session has no workbook".to_string())
    })?;

    let headers = [
        (header::CONTENT_TYPE, OUTPUT_MIME.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", OUTPUT_FILE_NAME),
        ),
    ];

    Ok((headers, workbook).into_response())
}
