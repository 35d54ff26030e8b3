//! Text embeddings for resumes, job descriptions and portfolio documents.
//!
//! `AppState` holds an `Arc<dyn Embedder>`: an `HfEmbedder` wrapped in a
//! `CachedEmbedder`. Vectors are compared with `cosine_similarity`.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use crate::errors::AppError;

pub mod cache;
pub mod similarity;

pub use cache::CachedEmbedder;
pub use similarity::cosine_similarity;

/// Model served by the default feature-extraction endpoint (384 dimensions).
pub const DEFAULT_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";

#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embeds a batch of texts, returning one vector per input in the same order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, AppError>;

    fn model_name(&self) -> &str;

    async fn embed(&self, text: &str) -> Result<Vec<f32>, AppError> {
        let mut vectors = self.embed_batch(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| AppError::Embedding("embedding service returned no vectors".to_string()))
    }
}

#[derive(Debug, Serialize)]
struct FeatureExtractionRequest<'a> {
    inputs: &'a [String],
}

/// Embedder backed by the Hugging Face feature-extraction pipeline.
pub struct HfEmbedder {
    client: Client,
    api_url: String,
    api_key: String,
}

impl HfEmbedder {
    pub fn new(api_url: String, api_key: String) -> anyhow::Result<Self> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(60))
                .build()?,
            api_url,
            api_key,
        })
    }
}

#[async_trait]
impl Embedder for HfEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, AppError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&FeatureExtractionRequest { inputs: texts })
            .send()
            .await
            .map_err(|e| AppError::Embedding(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Embedding(format!(
                "embedding API returned {status}: {body}"
            )));
        }

        let vectors: Vec<Vec<f32>> = response
            .json()
            .await
            .map_err(|e| AppError::Embedding(format!("unexpected response shape: {e}")))?;

        if vectors.len() != texts.len() {
            return Err(AppError::Embedding(format!(
                "expected {} vectors, got {}",
                texts.len(),
                vectors.len()
            )));
        }

        debug!(
            "Embedded {} texts (dimension {})",
            vectors.len(),
            vectors.first().map(Vec::len).unwrap_or(0)
        );

        Ok(vectors)
    }

    fn model_name(&self) -> &str {
        DEFAULT_MODEL
    }
}

#[cfg(test)]
pub mod testing {
    //! Deterministic in-process embedder for tests.

    use super::*;

    /// Embeds text as a bag of lowercase letter counts (26 dimensions).
    pub struct LetterCountEmbedder;

    #[async_trait]
    impl Embedder for LetterCountEmbedder {
        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, AppError> {
            Ok(texts.iter().map(|t| letter_counts(t)).collect())
        }

        fn model_name(&self) -> &str {
            "letter-count"
        }
    }

    pub fn letter_counts(text: &str) -> Vec<f32> {
        let mut v = vec![0.0_f32; 26];
        for c in text.chars().filter(|c| c.is_ascii_alphabetic()) {
            v[(c.to_ascii_lowercase() as u8 - b'a') as usize] += 1.0;
        }
        v
    }
}

#[cfg(test)]
mod tests {
    use super::testing::LetterCountEmbedder;
    use super::*;

    #[tokio::test]
    async fn test_default_embed_uses_batch() {
        let v = LetterCountEmbedder.embed("aab").await.unwrap();
        assert_eq!(v.len(), 26);
        assert_eq!(v[0], 2.0);
        assert_eq!(v[1], 1.0);
    }

    #[test]
    fn test_feature_extraction_request_shape() {
        let texts = vec!["hello".to_string()];
        let body = serde_json::to_value(FeatureExtractionRequest { inputs: &texts }).unwrap();
        assert_eq!(body, serde_json::json!({"inputs": ["hello"]}));
    }
}
