//! Axum route handlers for the Personality API.

use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::parse_flag;
use crate::errors::AppError;
use crate::models::personality::PersonalityAnalysisRow;
use crate::personality::storage::{
    get_analysis_history, insert_analysis, public_video_url, upload_video, video_storage_key,
    NewAnalysis,
};
use crate::personality::traits::{describe_scores, TraitResult};
use crate::state::AppState;

pub const MAX_VIDEO_BYTES: usize = 100 * 1024 * 1024;
/// Request body limit for the upload route: the video plus the small form fields.
pub const MAX_UPLOAD_BODY_BYTES: usize = MAX_VIDEO_BYTES + 1024 * 1024;
pub const ALLOWED_VIDEO_TYPES: [&str; 4] =
    ["video/mp4", "video/avi", "video/quicktime", "video/x-matroska"];

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct VideoUpload {
    pub filename: String,
    pub content_type: String,
    pub data: Bytes,
}

#[derive(Debug, Default)]
pub struct AnalyzeForm {
    pub video: Option<VideoUpload>,
    pub student_id: Option<Uuid>,
    pub upload_to_storage: bool,
}

#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    pub success: bool,
    pub results: Option<Vec<TraitResult>>,
    pub error: Option<String>,
    pub storage_path: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub success: bool,
    pub student_id: Uuid,
    pub analyses: Vec<PersonalityAnalysisRow>,
    pub count: usize,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /personality/analyze
///
/// Multipart fields: `video` (required), `student_id`, `upload_to_storage`.
/// An analysis failure is reported in the body with `success: false`.
pub async fn handle_analyze_video(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalysisResponse>, AppError> {
    let form = read_analyze_form(multipart).await?;
    let video = form
        .video
        .ok_or_else(|| AppError::Validation("Missing 'video' file field".to_string()))?;

    info!(
        "Analyzing video {} ({} bytes)",
        video.filename,
        video.data.len()
    );

    let mut storage_path = None;
    let mut video_url = None;
    if form.upload_to_storage {
        let key = video_storage_key(form.student_id, &video.filename, Utc::now());
        match upload_video(
            &state.s3,
            &state.config.s3_bucket,
            &key,
            video.data.clone(),
            &video.content_type,
        )
        .await
        {
            Ok(()) => {
                video_url = Some(public_video_url(
                    &state.config.s3_public_url,
                    &state.config.s3_bucket,
                    &key,
                ));
                storage_path = Some(key);
            }
            // Analysis proceeds without a stored copy.
            Err(e) => warn!("Video upload failed: {e}"),
        }
    }

    let analysis = state
        .video_analyzer
        .analyze(video.data, &video.filename, &video.content_type)
        .await
        .and_then(|scores| describe_scores(&scores));

    let results = match analysis {
        Ok(results) => results,
        Err(error) => {
            warn!("Personality analysis failed: {error}");
            return Ok(Json(AnalysisResponse {
                success: false,
                results: None,
                error: Some(error),
                storage_path,
            }));
        }
    };

    if let Some(student_id) = form.student_id {
        let stored = insert_analysis(
            &state.db,
            NewAnalysis {
                student_id,
                video_filename: &video.filename,
                video_url: video_url.as_deref(),
                storage_path: storage_path.as_deref(),
                results: &results,
            },
        )
        .await;
        match stored {
            Ok(id) => info!("Stored personality analysis {id} for student {student_id}"),
            Err(e) => warn!("Could not store personality analysis: {e}"),
        }
    }

    Ok(Json(AnalysisResponse {
        success: true,
        results: Some(results),
        error: None,
        storage_path,
    }))
}

/// GET /personality/student/:student_id/history
pub async fn handle_analysis_history(
    State(state): State<AppState>,
    Path(student_id): Path<Uuid>,
) -> Result<Json<HistoryResponse>, AppError> {
    let analyses = get_analysis_history(&state.db, student_id).await?;
    Ok(Json(HistoryResponse {
        success: true,
        student_id,
        count: analyses.len(),
        analyses,
    }))
}

// ────────────────────────────────────────────────────────────────────────────
// Multipart parsing
// ────────────────────────────────────────────────────────────────────────────

async fn read_analyze_form(mut multipart: Multipart) -> Result<AnalyzeForm, AppError> {
    let mut form = AnalyzeForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "video" => {
                let filename = field.file_name().unwrap_or("video").to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();
                validate_content_type(&content_type)?;

                let data = field.bytes().await.map_err(multipart_error)?;
                if data.len() > MAX_VIDEO_BYTES {
                    return Err(too_large());
                }
                form.video = Some(VideoUpload {
                    filename,
                    content_type,
                    data,
                });
            }
            "student_id" => {
                let text = field.text().await.map_err(multipart_error)?;
                let text = text.trim();
                if !text.is_empty() {
                    let id = Uuid::parse_str(text).map_err(|_| {
                        AppError::Validation(format!("Invalid student_id: {text}"))
                    })?;
                    form.student_id = Some(id);
                }
            }
            "upload_to_storage" => {
                let text = field.text().await.map_err(multipart_error)?;
                form.upload_to_storage = parse_flag(Some(text.trim()), false);
            }
            _ => {}
        }
    }

    Ok(form)
}

pub fn validate_content_type(content_type: &str) -> Result<(), AppError> {
    if ALLOWED_VIDEO_TYPES.contains(&content_type) {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "Invalid file type. Allowed: mp4, avi, mov, mkv. Got: {content_type}"
        )))
    }
}

fn too_large() -> AppError {
    AppError::PayloadTooLarge("File too large. Maximum size: 100MB".to_string())
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        too_large()
    } else {
        AppError::Validation(format!("Invalid multipart body: {}", e.body_text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_content_types() {
        for ct in ALLOWED_VIDEO_TYPES {
            assert!(validate_content_type(ct).is_ok());
        }
        match validate_content_type("image/png") {
            Err(AppError::Validation(msg)) => assert!(msg.ends_with("Got: image/png")),
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn test_failed_analysis_response_shape() {
        let response = AnalysisResponse {
            success: false,
            results: None,
            error: Some("analysis unavailable".to_string()),
            storage_path: None,
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["success"], false);
        assert_eq!(value["error"], "analysis unavailable");
        assert!(value["results"].is_null());
    }
}
