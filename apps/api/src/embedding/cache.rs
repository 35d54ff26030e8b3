//! Redis-backed embedding cache.
//!
//! Keys are `embedding:<model>:<xxh3-64 of text>`; values are JSON arrays.
//! Redis failures never fail a request: the wrapped embedder is called instead.

use std::sync::Arc;

use async_trait::async_trait;
use redis::AsyncCommands;
use tracing::{debug, warn};
use xxhash_rust::xxh3::xxh3_64;

use crate::embedding::Embedder;
use crate::errors::AppError;

const CACHE_TTL_SECS: u64 = 24 * 60 * 60;

pub struct CachedEmbedder {
    inner: Arc<dyn Embedder>,
    redis: redis::Client,
}

impl CachedEmbedder {
    pub fn new(inner: Arc<dyn Embedder>, redis: redis::Client) -> Self {
        Self { inner, redis }
    }

    async fn lookup(&self, keys: &[String]) -> Option<Vec<Option<Vec<f32>>>> {
        let mut conn = match self.redis.get_multiplexed_async_connection().await {
            Ok(c) => c,
            Err(e) => {
                warn!("Embedding cache unavailable: {e}");
                return None;
            }
        };

        let raw: Vec<Option<String>> = if keys.len() == 1 {
            match conn.get::<_, Option<String>>(&keys[0]).await {
                Ok(v) => vec![v],
                Err(e) => {
                    warn!("Embedding cache read failed: {e}");
                    return None;
                }
            }
        } else {
            match conn.mget::<_, Vec<Option<String>>>(keys).await {
                Ok(v) => v,
                Err(e) => {
                    warn!("Embedding cache read failed: {e}");
                    return None;
                }
            }
        };

        Some(
            raw.into_iter()
                .map(|v| v.and_then(|s| serde_json::from_str(&s).ok()))
                .collect(),
        )
    }

    async fn store(&self, entries: &[(String, Vec<f32>)]) {
        let mut conn = match self.redis.get_multiplexed_async_connection().await {
            Ok(c) => c,
            Err(e) => {
                warn!("Embedding cache unavailable: {e}");
                return;
            }
        };

        for (key, vector) in entries {
            let Ok(value) = serde_json::to_string(vector) else {
                continue;
            };
            if let Err(e) = conn.set_ex::<_, _, ()>(key, value, CACHE_TTL_SECS).await {
                warn!("Embedding cache write failed: {e}");
                return;
            }
        }
    }
}

pub fn cache_key(model: &str, text: &str) -> String {
    format!("embedding:{model}:{:016x}", xxh3_64(text.as_bytes()))
}

#[async_trait]
impl Embedder for CachedEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, AppError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let keys: Vec<String> = texts
            .iter()
            .map(|t| cache_key(self.inner.model_name(), t))
            .collect();

        let cached = self
            .lookup(&keys)
            .await
            .unwrap_or_else(|| vec![None; texts.len()]);

        let missing: Vec<usize> = cached
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_none())
            .map(|(i, _)| i)
            .collect();

        debug!(
            "Embedding cache: {} hits, {} misses",
            texts.len() - missing.len(),
            missing.len()
        );

        let mut results = cached;
        if !missing.is_empty() {
            let to_embed: Vec<String> = missing.iter().map(|&i| texts[i].clone()).collect();
            let fresh = self.inner.embed_batch(&to_embed).await?;

            let mut writes = Vec::with_capacity(fresh.len());
            for (&i, vector) in missing.iter().zip(fresh) {
                writes.push((keys[i].clone(), vector.clone()));
                results[i] = Some(vector);
            }
            self.store(&writes).await;
        }

        results
            .into_iter()
            .map(|v| v.ok_or_else(|| AppError::Embedding("missing embedding".to_string())))
            .collect()
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }
}
