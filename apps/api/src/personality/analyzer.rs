//! Client for the external video-analysis service.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use tracing::info;

#[async_trait]
pub trait VideoAnalyzer: Send + Sync {
    /// Returns the raw trait scores for a video, in `TRAIT_NAMES` order.
    async fn analyze(
        &self,
        video: Bytes,
        filename: &str,
        content_type: &str,
    ) -> Result<Vec<f64>, String>;
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    scores: Vec<f64>,
}

/// Posts the video as multipart to `<base_url>/predict`.
pub struct HttpVideoAnalyzer {
    client: Client,
    base_url: String,
}

impl HttpVideoAnalyzer {
    pub fn new(base_url: String) -> anyhow::Result<Self> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(300))
                .build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl VideoAnalyzer for HttpVideoAnalyzer {
    async fn analyze(
        &self,
        video: Bytes,
        filename: &str,
        content_type: &str,
    ) -> Result<Vec<f64>, String> {
        let part = Part::bytes(video.to_vec())
            .file_name(filename.to_string())
            .mime_str(content_type)
            .map_err(|e| format!("invalid content type: {e}"))?;
        let form = Form::new().part("video", part);

        let response = self
            .client
            .post(format!("{}/predict", self.base_url))
            .multipart(form)
            .send()
            .await
            .map_err(|e| format!("video analysis request failed: {e}"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(format!("video analysis service returned {status}: {body}"));
        }

        let parsed: PredictResponse = response
            .json()
            .await
            .map_err(|e| format!("unexpected video analysis response: {e}"))?;

        info!("Video analysis returned {} scores", parsed.scores.len());
        Ok(parsed.scores)
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;

    /// Returns fixed scores, or an error when constructed with `None`.
    pub struct FixedAnalyzer(pub Option<Vec<f64>>);

    #[async_trait]
    impl VideoAnalyzer for FixedAnalyzer {
        async fn analyze(&self, _: Bytes, _: &str, _: &str) -> Result<Vec<f64>, String> {
            self.0
                .clone()
                .ok_or_else(|| "analysis unavailable".to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predict_response_shape() {
        let parsed: PredictResponse =
            serde_json::from_str(r#"{"scores": [0.1, 0.2, 0.3, 0.4, 0.5, 0.6]}"#).unwrap();
        assert_eq!(parsed.scores.len(), 6);
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let analyzer = HttpVideoAnalyzer::new("http://localhost:8001/".to_string()).unwrap();
        assert_eq!(analyzer.base_url, "http://localhost:8001");
    }
}
