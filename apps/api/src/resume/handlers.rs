//! Axum route handlers for the Resume API.

use axum::{
    extract::{Path, State},
    Form, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::matching::{attach_profiles, CandidateMatch};
use crate::models::profile::ProfileRow;
use crate::models::resume::ResumeRecord;
use crate::profiles::get_profile;
use crate::resume::parser::{extract_resume_text, filename_from_url};
use crate::resume::store::{
    delete_resume_embedding, get_resume_record, search_similar_resumes, upsert_resume_embedding,
    NewResumeEmbedding, UpsertAction,
};
use crate::state::AppState;

const DEFAULT_SEARCH_TOP_K: usize = 10;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ProcessResumeForm {
    pub student_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct ProcessResumeResponse {
    pub success: bool,
    pub message: String,
    pub embedding_id: Uuid,
    pub student_id: Uuid,
    pub text_length: usize,
    pub embedding_dimension: usize,
    pub action: UpsertAction,
}

#[derive(Debug, Serialize)]
pub struct StudentResumeResponse {
    #[serde(flatten)]
    pub resume: ResumeRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<ProfileRow>,
}

#[derive(Debug, Deserialize)]
pub struct SearchForm {
    pub job_description: String,
    pub top_k: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub success: bool,
    pub query: String,
    pub results: Vec<CandidateMatch>,
    pub count: usize,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /resume/process
///
/// Downloads the student's uploaded resume, extracts its text, embeds it and
/// stores (or replaces) the student's resume embedding.
pub async fn handle_process_resume(
    State(state): State<AppState>,
    Form(form): Form<ProcessResumeForm>,
) -> Result<Json<ProcessResumeResponse>, AppError> {
    let student_id = form.student_id;
    info!("Processing resume for student {student_id}");

    let profile = get_profile(&state.db, student_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Student profile not found".to_string()))?;

    let resume_url = profile
        .resume_url
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| AppError::Validation("No resume uploaded for this student".to_string()))?;

    let response = state
        .http
        .get(&resume_url)
        .timeout(std::time::Duration::from_secs(30))
        .send()
        .await
        .map_err(|e| AppError::Upstream(format!("resume download failed: {e}")))?;

    if !response.status().is_success() {
        return Err(AppError::Validation(format!(
            "Could not download resume. Status: {}",
            response.status().as_u16()
        )));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| AppError::Upstream(format!("resume download failed: {e}")))?;

    // pdf-extract is CPU bound and can panic on malformed files.
    let resume_text = tokio::task::spawn_blocking(move || extract_resume_text(&bytes))
        .await
        .map_err(|e| {
            warn!("PDF extraction task failed: {e}");
            AppError::Validation("Error parsing PDF".to_string())
        })??;

    info!("Extracted {} characters", resume_text.chars().count());

    let embedding = state.embedder.embed(&resume_text).await?;
    info!("Generated embedding with {} dimensions", embedding.len());

    let filename = filename_from_url(&resume_url);
    let metadata = json!({ "resume_url": resume_url });
    let (embedding_id, action) = upsert_resume_embedding(
        &state.db,
        NewResumeEmbedding {
            student_id,
            resume_text: &resume_text,
            embedding: &embedding,
            filename: &filename,
            metadata: &metadata,
        },
    )
    .await?;

    Ok(Json(ProcessResumeResponse {
        success: true,
        message: "Resume processed and vectorized successfully".to_string(),
        embedding_id,
        student_id,
        text_length: resume_text.chars().count(),
        embedding_dimension: embedding.len(),
        action,
    }))
}

/// GET /resume/student/:student_id
pub async fn handle_get_student_resume(
    State(state): State<AppState>,
    Path(student_id): Path<Uuid>,
) -> Result<Json<StudentResumeResponse>, AppError> {
    let resume = get_resume_record(&state.db, student_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Resume not found for this student".to_string()))?;

    let profile = get_profile(&state.db, student_id).await?;

    Ok(Json(StudentResumeResponse { resume, profile }))
}

/// DELETE /resume/student/:student_id
///
/// Called when a student removes their resume. Deleting an absent resume succeeds.
pub async fn handle_delete_student_resume(
    State(state): State<AppState>,
    Path(student_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let removed = delete_resume_embedding(&state.db, student_id).await?;
    info!("Deleted {removed} resume embedding(s) for student {student_id}");

    Ok(Json(json!({
        "success": true,
        "message": format!("Resume embeddings deleted for student {student_id}")
    })))
}

/// POST /resume/search
///
/// Returns the top-k resumes most similar to a job description, with profile data.
pub async fn handle_search_candidates(
    State(state): State<AppState>,
    Form(form): Form<SearchForm>,
) -> Result<Json<SearchResponse>, AppError> {
    if form.job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "job_description cannot be empty".to_string(),
        ));
    }
    let top_k = form.top_k.unwrap_or(DEFAULT_SEARCH_TOP_K);

    let query_embedding = state.embedder.embed(&form.job_description).await?;
    let hits = search_similar_resumes(&state.db, &query_embedding, top_k, 0.0).await?;
    let results = attach_profiles(&state.db, hits).await?;

    info!("Found {} matching candidates", results.len());

    Ok(Json(SearchResponse {
        success: true,
        query: form.job_description,
        count: results.len(),
        results,
    }))
}
