//! Axum route handlers for candidate matching.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::matching::custom_rag::{query_custom_rag, DEFAULT_THRESHOLD, DEFAULT_TOP_K};
use crate::matching::{attach_profiles, CandidateMatch};
use crate::profiles::get_job;
use crate::resume::store::ResumeHit;
use crate::state::AppState;

const RANKING_METHOD: &str = "custom_rag_rerank";
const DEFAULT_JOB_MATCHES: usize = 10;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CustomRagRequest {
    pub query: String,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

#[derive(Debug, Serialize)]
pub struct CustomRagResponse {
    pub success: bool,
    pub query: String,
    pub ranking_method: &'static str,
    pub reranker: &'static str,
    pub results: Vec<ResumeHit>,
}

#[derive(Debug, Deserialize)]
pub struct JobMatchesQuery {
    pub top_k: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct JobMatchesResponse {
    pub success: bool,
    pub job_id: Uuid,
    pub job_title: String,
    pub ranking_method: &'static str,
    pub matches: Vec<CandidateMatch>,
    pub count: usize,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /rag/query/customrag
pub async fn handle_custom_rag_query(
    State(state): State<AppState>,
    Json(request): Json<CustomRagRequest>,
) -> Result<Json<CustomRagResponse>, AppError> {
    if request.query.trim().is_empty() {
        return Err(AppError::Validation("query cannot be empty".to_string()));
    }

    let results = query_custom_rag(
        &state.db,
        state.embedder.as_ref(),
        state.reranker.as_ref(),
        &request.query,
        request.top_k,
        DEFAULT_THRESHOLD,
    )
    .await?;

    Ok(Json(CustomRagResponse {
        success: true,
        query: request.query,
        ranking_method: RANKING_METHOD,
        reranker: state.reranker.name(),
        results,
    }))
}

/// GET /jobs/:job_id/matches
///
/// Ranks candidates for a posted job using its description as the query.
pub async fn handle_job_matches(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    Query(params): Query<JobMatchesQuery>,
) -> Result<Json<JobMatchesResponse>, AppError> {
    let job = get_job(&state.db, job_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Job not found".to_string()))?;

    let description = job
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .ok_or_else(|| AppError::Validation("Job has no description to match on".to_string()))?;

    let top_k = params.top_k.unwrap_or(DEFAULT_JOB_MATCHES);
    let hits = query_custom_rag(
        &state.db,
        state.embedder.as_ref(),
        state.reranker.as_ref(),
        description,
        top_k,
        DEFAULT_THRESHOLD,
    )
    .await?;
    let matches = attach_profiles(&state.db, hits).await?;

    info!("Found {} matches for job {job_id}", matches.len());

    Ok(Json(JobMatchesResponse {
        success: true,
        job_id,
        job_title: job.title,
        ranking_method: RANKING_METHOD,
        count: matches.len(),
        matches,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_rag_request_defaults_top_k() {
        let request: CustomRagRequest =
            serde_json::from_str(r#"{"query": "rust engineer"}"#).unwrap();
        assert_eq!(request.top_k, 3);
    }

    #[test]
    fn test_candidate_match_flattens_hit() {
        let hit = ResumeHit {
            id: Uuid::nil(),
            student_id: Uuid::nil(),
            resume_text: "text".to_string(),
            filename: "cv.pdf".to_string(),
            similarity: 0.5,
            rerank_score: Some(0.9),
        };
        let value = serde_json::to_value(CandidateMatch { hit, profile: None }).unwrap();
        assert_eq!(value["filename"], "cv.pdf");
        assert_eq!(value["rerank_score"], serde_json::json!(0.9_f32));
        assert!(value.get("profile").is_none());
    }
}
