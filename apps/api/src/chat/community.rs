//! Recruiter assistant: retrieves candidates for a free-text request and asks
//! the LLM to rank them.

use std::collections::HashSet;

use sqlx::PgPool;
use tracing::info;

use crate::chat::prompts::{COMMUNITY_PROMPT_TEMPLATE, COMMUNITY_SYSTEM};
use crate::embedding::Embedder;
use crate::errors::AppError;
use crate::llm_client::LlmClient;
use crate::matching::custom_rag::query_custom_rag;
use crate::matching::reranker::Reranker;
use crate::matching::attach_profiles;
use crate::resume::store::{search_similar_resumes, ResumeHit};

pub const COMMUNITY_TOP_K: usize = 5;
const RESUME_EXCERPT_CHARS: usize = 600;
pub const NO_CANDIDATES_RESPONSE: &str = "No matching candidates found.";

/// A retrieved candidate as shown to the LLM.
#[derive(Debug, Clone, PartialEq)]
pub struct CommunityCandidate {
    pub name: String,
    pub skills: String,
    pub similarity: f32,
    pub resume_excerpt: String,
}

pub struct CommunityRetrieval<'a> {
    pub pool: &'a PgPool,
    pub embedder: &'a dyn Embedder,
    pub reranker: &'a dyn Reranker,
    pub use_custom_rag: bool,
}

/// Answers a recruiter request with a ranked assessment of the best candidates.
pub async fn answer_recruiter_query(
    retrieval: CommunityRetrieval<'_>,
    llm: &LlmClient,
    message: &str,
    temperature: f32,
) -> Result<String, AppError> {
    let hits = if retrieval.use_custom_rag {
        query_custom_rag(
            retrieval.pool,
            retrieval.embedder,
            retrieval.reranker,
            message,
            COMMUNITY_TOP_K,
            0.0,
        )
        .await?
    } else {
        let query_embedding = retrieval.embedder.embed(message).await?;
        search_similar_resumes(retrieval.pool, &query_embedding, COMMUNITY_TOP_K, 0.0).await?
    };

    let matches = attach_profiles(retrieval.pool, dedupe_by_student(hits)).await?;
    let candidates: Vec<CommunityCandidate> = matches
        .into_iter()
        .filter_map(|m| {
            let profile = m.profile?;
            Some(CommunityCandidate {
                name: profile.name.unwrap_or_else(|| "Unknown".to_string()),
                skills: profile.skills.unwrap_or_else(|| "N/A".to_string()),
                similarity: m.hit.similarity,
                resume_excerpt: m.hit.resume_text.chars().take(RESUME_EXCERPT_CHARS).collect(),
            })
        })
        .collect();

    if candidates.is_empty() {
        return Ok(NO_CANDIDATES_RESPONSE.to_string());
    }
    info!("Ranking {} candidates for recruiter query", candidates.len());

    let user = COMMUNITY_PROMPT_TEMPLATE
        .replace("{candidates}", &format_candidates(&candidates))
        .replace("{query}", message);
    Ok(llm.generate_text(COMMUNITY_SYSTEM, &user, temperature).await?)
}

/// Keeps the first (best-ranked) hit per student.
pub fn dedupe_by_student(hits: Vec<ResumeHit>) -> Vec<ResumeHit> {
    let mut seen = HashSet::new();
    hits.into_iter()
        .filter(|h| seen.insert(h.student_id))
        .collect()
}

/// Numbered candidate list used as LLM context.
pub fn format_candidates(candidates: &[CommunityCandidate]) -> String {
    candidates
        .iter()
        .enumerate()
        .map(|(i, c)| {
            format!(
                "{}. {} (similarity: {:.3})\nSkills: {}\nResume excerpt: {}",
                i + 1,
                c.name,
                c.similarity,
                c.skills,
                c.resume_excerpt
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
