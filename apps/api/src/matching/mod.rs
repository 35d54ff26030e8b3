// Candidate matching: vector retrieval over resumes followed by reranking.

use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::profile::ProfileSummary;
use crate::profiles::get_profile_summaries;
use crate::resume::store::ResumeHit;

pub mod custom_rag;
pub mod handlers;
pub mod reranker;

/// A ranked resume enriched with the candidate's profile summary.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateMatch {
    #[serde(flatten)]
    pub hit: ResumeHit,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<ProfileSummary>,
}

/// Looks up profile summaries for every hit in one query, preserving hit order.
pub async fn attach_profiles(
    pool: &PgPool,
    hits: Vec<ResumeHit>,
) -> Result<Vec<CandidateMatch>, sqlx::Error> {
    let ids: Vec<Uuid> = hits.iter().map(|h| h.student_id).collect();
    let profiles = get_profile_summaries(pool, &ids).await?;

    Ok(hits
        .into_iter()
        .map(|hit| {
            let profile = profiles.iter().find(|p| p.id == hit.student_id).cloned();
            CandidateMatch { hit, profile }
        })
        .collect())
}
