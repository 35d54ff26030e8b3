//! Axum route handlers for the Schedule API.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::schedule::MeetingProposalRow;
use crate::schedule::parser::{describe_slots, parse_current_date, parse_schedule};
use crate::schedule::proposals::{
    cancel_proposal, confirm_proposal, create_proposal, list_proposals, NewProposal,
    ProposalFilter,
};
use crate::schedule::TimeSlot;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ScheduleRequest {
    pub message: String,
    pub current_date: String,
}

#[derive(Debug, Serialize)]
pub struct ScheduleResponse {
    pub slots: Vec<TimeSlot>,
    pub ai_message: String,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmRequest {
    pub slot: TimeSlot,
}

#[derive(Debug, Serialize)]
pub struct ProposalListResponse {
    pub proposals: Vec<MeetingProposalRow>,
    pub count: usize,
}

/// POST /schedule/parse_schedule
///
/// Turns "Monday and Tuesday at 9am" into concrete dated slots.
pub async fn handle_parse_schedule(
    Json(request): Json<ScheduleRequest>,
) -> Result<Json<ScheduleResponse>, AppError> {
    let today = parse_current_date(&request.current_date)?;
    let slots = parse_schedule(&request.message, today);
    info!("Parsed {} slots from scheduling request", slots.len());

    Ok(Json(ScheduleResponse {
        ai_message: describe_slots(&slots),
        slots,
    }))
}

/// POST /schedule/proposals
pub async fn handle_create_proposal(
    State(state): State<AppState>,
    Json(request): Json<NewProposal>,
) -> Result<(StatusCode, Json<MeetingProposalRow>), AppError> {
    let proposal = create_proposal(&state.db, request).await?;
    Ok((StatusCode::CREATED, Json(proposal)))
}

/// POST /schedule/proposals/:id/confirm
pub async fn handle_confirm_proposal(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ConfirmRequest>,
) -> Result<Json<MeetingProposalRow>, AppError> {
    Ok(Json(confirm_proposal(&state.db, id, request.slot).await?))
}

/// POST /schedule/proposals/:id/cancel
pub async fn handle_cancel_proposal(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MeetingProposalRow>, AppError> {
    Ok(Json(cancel_proposal(&state.db, id).await?))
}

/// GET /schedule/proposals?student_id=&recruiter_id=&kind=
pub async fn handle_list_proposals(
    State(state): State<AppState>,
    Query(filter): Query<ProposalFilter>,
) -> Result<Json<ProposalListResponse>, AppError> {
    let proposals = list_proposals(&state.db, &filter).await?;
    Ok(Json(ProposalListResponse {
        count: proposals.len(),
        proposals,
    }))
}
