//! Reranking: a pluggable second pass over retrieved resumes.
//!
//! `CohereReranker` scores each resume against the query with a cross-encoder.
//! `SimilarityReranker` keeps the embedding similarity and needs no network.
//!
//! `AppState` holds an `Arc<dyn Reranker>`, chosen at startup from config.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::AppError;
use crate::resume::store::ResumeHit;

const COHERE_RERANK_URL: &str = "https://api.cohere.com/v1/rerank";
const COHERE_RERANK_MODEL: &str = "rerank-english-v3.0";

#[async_trait]
pub trait Reranker: Send + Sync {
    /// Returns one relevance score per hit, in the same order as `hits`.
    async fn rerank(&self, query: &str, hits: &[ResumeHit]) -> Result<Vec<f32>, AppError>;

    fn name(&self) -> &'static str;
}

// ────────────────────────────────────────────────────────────────────────────
// SimilarityReranker
// ────────────────────────────────────────────────────────────────────────────

pub struct SimilarityReranker;

#[async_trait]
impl Reranker for SimilarityReranker {
    async fn rerank(&self, _query: &str, hits: &[ResumeHit]) -> Result<Vec<f32>, AppError> {
        Ok(hits.iter().map(|h| h.similarity).collect())
    }

    fn name(&self) -> &'static str {
        "similarity"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// CohereReranker
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct CohereRerankRequest<'a> {
    model: &'a str,
    query: &'a str,
    documents: Vec<&'a str>,
    top_n: usize,
}

#[derive(Debug, Deserialize)]
struct CohereRerankResponse {
    results: Vec<CohereRerankResult>,
}

#[derive(Debug, Deserialize)]
struct CohereRerankResult {
    index: usize,
    relevance_score: f32,
}

pub struct CohereReranker {
    client: Client,
    api_key: String,
}

impl CohereReranker {
    pub fn new(api_key: String) -> anyhow::Result<Self> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()?,
            api_key,
        })
    }
}

#[async_trait]
impl Reranker for CohereReranker {
    async fn rerank(&self, query: &str, hits: &[ResumeHit]) -> Result<Vec<f32>, AppError> {
        if hits.is_empty() {
            return Ok(vec![]);
        }

        let request = CohereRerankRequest {
            model: COHERE_RERANK_MODEL,
            query,
            documents: hits.iter().map(|h| h.resume_text.as_str()).collect(),
            top_n: hits.len(),
        };

        let response = self
            .client
            .post(COHERE_RERANK_URL)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("rerank request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!(
                "rerank API returned {status}: {body}"
            )));
        }

        let parsed: CohereRerankResponse = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("unexpected rerank response: {e}")))?;

        debug!("Reranked {} documents", parsed.results.len());
        Ok(scores_by_index(&parsed.results, hits.len()))
    }

    fn name(&self) -> &'static str {
        "cohere"
    }
}

/// Results come back sorted by relevance; scores are placed by their `index`.
/// Documents the API omitted score 0.0.
fn scores_by_index(results: &[CohereRerankResult], len: usize) -> Vec<f32> {
    let mut scores = vec![0.0_f32; len];
    for r in results {
        if let Some(slot) = scores.get_mut(r.index) {
            *slot = r.relevance_score;
        }
    }
    scores
}
