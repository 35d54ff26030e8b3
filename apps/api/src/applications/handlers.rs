//! Axum route handlers for the Applications API.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::applications::{
    create_application, list_applicants, update_application_status, ApplicationStatus,
    NewApplication,
};
use crate::errors::AppError;
use crate::models::application::{ApplicantRow, ApplicationRow};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateApplicationRequest {
    pub job_id: Uuid,
    pub student_id: Uuid,
    pub cover_letter: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: ApplicationStatus,
}

#[derive(Debug, Serialize)]
pub struct ApplicantsResponse {
    pub job_id: Uuid,
    pub applicants: Vec<ApplicantRow>,
    pub count: usize,
}

/// POST /applications
pub async fn handle_create_application(
    State(state): State<AppState>,
    Json(request): Json<CreateApplicationRequest>,
) -> Result<(StatusCode, Json<ApplicationRow>), AppError> {
    let row = create_application(
        &state.db,
        NewApplication {
            job_id: request.job_id,
            student_id: request.student_id,
            cover_letter: request.cover_letter.filter(|c| !c.trim().is_empty()),
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// GET /jobs/:job_id/applicants
pub async fn handle_list_applicants(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<ApplicantsResponse>, AppError> {
    let applicants = list_applicants(&state.db, job_id).await?;
    Ok(Json(ApplicantsResponse {
        job_id,
        count: applicants.len(),
        applicants,
    }))
}

/// PATCH /applications/:id/status
pub async fn handle_update_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<ApplicationRow>, AppError> {
    Ok(Json(
        update_application_status(&state.db, id, request.status).await?,
    ))
}
