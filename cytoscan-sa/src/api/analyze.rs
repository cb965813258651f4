//! Upload-and-analyze API handler
//!
//! POST /analyze accepts one multipart media field ("video" or
//! "image"), stores the payload, runs the heuristic pipeline, persists
//! the result record, and returns it.

use axum::{
    extract::{Multipart, State},
    routing::post,
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use cytoscan_common::events::CytoEvent;

use crate::{
    db,
    error::{ApiError, ApiResult},
    models::{AnalysisRecord, MediaKind},
    services::{AnalysisOrchestrator, UploadedMedia},
    AppState,
};

/// POST /analyze response
#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    pub message: String,
    pub data: AnalysisRecord,
    pub file_type: String,
}

/// One extracted multipart upload
struct UploadField {
    field_name: String,
    filename: String,
    declared_type: Option<String>,
    bytes: Vec<u8>,
}

/// POST /analyze
///
/// Rejects structurally invalid requests (no file, unsupported media
/// type) before any heuristic work runs. Boring content is NOT an
/// error: it produces a persisted zero-result record.
pub async fn analyze_media(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Json<AnalyzeResponse>> {
    let upload = extract_media_field(multipart).await?;
    let kind = resolve_media_kind(&upload)?;

    tracing::info!(
        filename = %upload.filename,
        kind = kind.as_str(),
        bytes = upload.bytes.len(),
        "Upload accepted for analysis"
    );

    state.event_bus.emit(CytoEvent::AnalysisStarted {
        filename: upload.filename.clone(),
        media_kind: kind.as_str().to_string(),
        timestamp: Utc::now(),
    });

    // Object-store write; failures here are explicit errors, they never
    // masquerade as an analysis outcome
    let stored = match state.media.store(kind, &upload.filename, &upload.bytes) {
        Ok(stored) => stored,
        Err(err) => {
            *state.last_error.write().await = Some(err.to_string());
            return Err(err.into());
        }
    };

    // The analysis itself: one synchronous pure pass over the buffer
    let params = db::settings::load_analysis_parameters(&state.db).await?;
    let orchestrator = AnalysisOrchestrator::new(params);
    let media = UploadedMedia {
        bytes: upload.bytes,
        kind,
        filename: upload.filename.clone(),
    };
    let outcome = orchestrator.analyze(&media);

    let record = AnalysisRecord {
        id: Uuid::new_v4(),
        filename: upload.filename,
        media_type: kind,
        sperm_count: outcome.cell_count,
        speed_avg: outcome.average_speed,
        motility: outcome.motility_percent,
        morphology: outcome.morphology,
        concentration: outcome.concentration,
        total_motile_count: outcome.total_motile_count,
        processing_time_seconds: outcome.processing_time_seconds,
        movement_pattern: outcome.movement_pattern,
        confidence_score: outcome.quality_score,
        analysis_status: outcome.status,
        media_url: Some(stored.public_url),
        created_at: Utc::now(),
    };

    if let Err(err) = db::results::insert_result(&state.db, &record).await {
        *state.last_error.write().await = Some(err.to_string());
        return Err(err.into());
    }

    state.event_bus.emit(CytoEvent::AnalysisCompleted {
        result_id: record.id,
        filename: record.filename.clone(),
        cell_count: record.sperm_count,
        status: record.analysis_status.as_str().to_string(),
        timestamp: Utc::now(),
    });

    tracing::info!(
        result_id = %record.id,
        cell_count = record.sperm_count,
        status = record.analysis_status.as_str(),
        "Analysis result persisted"
    );

    Ok(Json(AnalyzeResponse {
        success: true,
        message: format!("{} analyzed successfully", capitalized(kind.as_str())),
        file_type: kind.as_str().to_string(),
        data: record,
    }))
}

/// Pull the first "video" or "image" field out of the multipart body
async fn extract_media_field(mut multipart: Multipart) -> Result<UploadField, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart request: {}", e)))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        if field_name != "video" && field_name != "image" {
            continue;
        }

        let filename = field
            .file_name()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "upload".to_string());
        let declared_type = field.content_type().map(|s| s.to_string());
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {}", e)))?
            .to_vec();

        return Ok(UploadField {
            field_name,
            filename,
            declared_type,
            bytes,
        });
    }

    Err(ApiError::BadRequest("No media file supplied".to_string()))
}

/// Resolve the media kind from the declared type, sniffed bytes, or field name
///
/// The declared content type wins when present; a type that is neither
/// video nor image is a hard input error, not a degraded signal.
fn resolve_media_kind(upload: &UploadField) -> Result<MediaKind, ApiError> {
    if let Some(declared) = &upload.declared_type {
        return MediaKind::from_content_type(declared)
            .ok_or_else(|| ApiError::UnsupportedMedia(declared.clone()));
    }

    // No declared type: sniff the payload
    if let Some(sniffed) = infer::get(&upload.bytes) {
        if let Some(kind) = MediaKind::from_content_type(sniffed.mime_type()) {
            return Ok(kind);
        }
    }

    // Unrecognizable bytes: trust the field name, matching the
    // degrade-gracefully policy for opaque-but-declared uploads
    upload
        .field_name
        .parse()
        .map_err(ApiError::UnsupportedMedia)
}

fn capitalized(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Build analyze routes
pub fn analyze_routes() -> Router<AppState> {
    Router::new().route("/analyze", post(analyze_media))
}
