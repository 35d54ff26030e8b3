//! Custom RAG candidate ranking.
//!
//! Flow: embed query → retrieve `top_k * 5` resumes by similarity →
//!       rerank → sort by rerank score → keep `top_k`.

use sqlx::PgPool;
use tracing::{info, warn};

use crate::embedding::Embedder;
use crate::errors::AppError;
use crate::matching::reranker::Reranker;
use crate::resume::store::{search_similar_resumes, ResumeHit};

pub const DEFAULT_TOP_K: usize = 3;
pub const DEFAULT_THRESHOLD: f32 = 0.3;
/// Retrieval over-fetch factor, giving the reranker options.
const RETRIEVAL_MULTIPLIER: usize = 5;

/// Ranks the candidates whose full resumes best match `query`.
pub async fn query_custom_rag(
    pool: &PgPool,
    embedder: &dyn Embedder,
    reranker: &dyn Reranker,
    query: &str,
    top_k: usize,
    threshold: f32,
) -> Result<Vec<ResumeHit>, AppError> {
    info!(
        "Custom RAG query ({} reranker, top {top_k}): {}",
        reranker.name(),
        query.chars().take(100).collect::<String>()
    );

    let query_embedding = embedder.embed(query).await?;
    let retrieved = search_similar_resumes(
        pool,
        &query_embedding,
        top_k.saturating_mul(RETRIEVAL_MULTIPLIER),
        threshold,
    )
    .await?;

    if retrieved.is_empty() {
        warn!("No relevant resumes found for query");
        return Ok(vec![]);
    }

    let scores = reranker.rerank(query, &retrieved).await?;
    let ranked = apply_rerank(retrieved, &scores, top_k);
    info!("Returning top {} ranked resumes", ranked.len());
    Ok(ranked)
}

/// Attaches rerank scores, sorts descending (stable, so ties keep retrieval
/// order) and truncates to `top_k`. Hits without a score rank last.
pub fn apply_rerank(mut hits: Vec<ResumeHit>, scores: &[f32], top_k: usize) -> Vec<ResumeHit> {
    for (hit, score) in hits.iter_mut().zip(scores) {
        hit.rerank_score = Some(*score);
    }

    hits.sort_by(|a, b| {
        let a = a.rerank_score.unwrap_or(f32::NEG_INFINITY);
        let b = b.rerank_score.unwrap_or(f32::NEG_INFINITY);
        b.total_cmp(&a)
    });
    hits.truncate(top_k);
    hits
}
