//! Axum route handlers for the Student API.

use axum::{extract::State, Form, Json};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::profiles::{get_jobs_by_ids, get_profile};
use crate::resume::store::{get_resume_by_student_id, search_student_resume};
use crate::state::AppState;
use crate::student::cover_letter::{
    generate_cover_letter, generate_resume_feedback, refine_cover_letter,
};

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct FeedbackForm {
    pub student_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct FeedbackResponse {
    pub student_id: Uuid,
    pub feedback: String,
}

#[derive(Debug, Deserialize)]
pub struct CoverLetterRequest {
    pub student_id: Uuid,
    pub job_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct GeneratedCoverLetter {
    pub job_id: Uuid,
    pub job_title: String,
    pub cover_letter: String,
}

#[derive(Debug, Serialize)]
pub struct CoverLettersResponse {
    pub student_id: Uuid,
    pub cover_letters: Vec<GeneratedCoverLetter>,
}

#[derive(Debug, Deserialize)]
pub struct RefinementRequest {
    pub original_letter: String,
    pub instruction: String,
}

#[derive(Debug, Serialize)]
pub struct RefinementResponse {
    pub refined_letter: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /student/feedback
pub async fn handle_resume_feedback(
    State(state): State<AppState>,
    Form(form): Form<FeedbackForm>,
) -> Result<Json<FeedbackResponse>, AppError> {
    let student_id = form.student_id;
    let resume = get_resume_by_student_id(&state.db, student_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Resume not found for student ID: {student_id}"))
        })?;

    let feedback = generate_resume_feedback(&state.llm, &resume.resume_text).await?;
    info!("Generated resume feedback for student {student_id}");

    Ok(Json(FeedbackResponse {
        student_id,
        feedback,
    }))
}

/// POST /student/generate-cover-letters
///
/// One cover letter per requested job, grounded in the parts of the student's
/// resume closest to each job description. Jobs without a description are skipped.
pub async fn handle_generate_cover_letters(
    State(state): State<AppState>,
    Json(request): Json<CoverLetterRequest>,
) -> Result<Json<CoverLettersResponse>, AppError> {
    let student_id = request.student_id;

    let profile = get_profile(&state.db, student_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Student profile not found.".to_string()))?;

    let jobs = get_jobs_by_ids(&state.db, &request.job_ids).await?;
    if jobs.is_empty() {
        return Err(AppError::NotFound(
            "No job descriptions found for given IDs".to_string(),
        ));
    }

    let mut cover_letters = Vec::with_capacity(jobs.len());
    for job in jobs {
        let Some(description) = job.description.as_deref().filter(|d| !d.trim().is_empty()) else {
            info!("Skipping job {} without a description", job.id);
            continue;
        };

        let query_embedding = state.embedder.embed(description).await?;
        let relevant: Vec<String> = search_student_resume(&state.db, student_id, &query_embedding)
            .await?
            .into_iter()
            .map(|hit| hit.resume_text)
            .collect();

        let cover_letter =
            generate_cover_letter(&state.llm, description, &relevant, profile.name.as_deref())
                .await?;

        cover_letters.push(GeneratedCoverLetter {
            job_id: job.id,
            job_title: job.title,
            cover_letter,
        });
    }

    info!(
        "Generated {} cover letters for student {student_id}",
        cover_letters.len()
    );

    Ok(Json(CoverLettersResponse {
        student_id,
        cover_letters,
    }))
}

/// POST /student/refine-cover-letter
pub async fn handle_refine_cover_letter(
    State(state): State<AppState>,
    Json(request): Json<RefinementRequest>,
) -> Result<Json<RefinementResponse>, AppError> {
    if request.original_letter.trim().is_empty() {
        return Err(AppError::Validation(
            "original_letter cannot be empty".to_string(),
        ));
    }
    if request.instruction.trim().is_empty() {
        return Err(AppError::Validation("instruction cannot be empty".to_string()));
    }

    let refined_letter =
        refine_cover_letter(&state.llm, &request.original_letter, &request.instruction).await?;

    Ok(Json(RefinementResponse { refined_letter }))
}
