use anyhow::{Context, Result};

const DEFAULT_LLM_API_URL: &str = "https://router.huggingface.co/v1/chat/completions";
const DEFAULT_EMBEDDING_API_URL: &str = "https://router.huggingface.co/hf-inference/models/sentence-transformers/all-MiniLM-L6-v2/pipeline/feature-extraction";
const DEFAULT_VIDEO_ANALYSIS_URL: &str = "http://localhost:8001";

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    /// Base URL used to build public links to uploaded objects.
    pub s3_public_url: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub hf_api_key: String,
    pub llm_api_url: String,
    pub embedding_api_url: String,
    pub cohere_api_key: Option<String>,
    pub video_analysis_url: String,
    pub github_token: Option<String>,
    /// Community chat retrieves candidates through rerank when set.
    pub enable_custom_rag: bool,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let s3_endpoint = require_env("S3_ENDPOINT")?;

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            redis_url: require_env("REDIS_URL")?,
            s3_bucket: require_env("S3_BUCKET")?,
            s3_public_url: optional_env("S3_PUBLIC_URL").unwrap_or_else(|| s3_endpoint.clone()),
            s3_endpoint,
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            hf_api_key: require_env("HF_API_KEY")?,
            llm_api_url: optional_env("LLM_API_URL")
                .unwrap_or_else(|| DEFAULT_LLM_API_URL.to_string()),
            embedding_api_url: optional_env("EMBEDDING_API_URL")
                .unwrap_or_else(|| DEFAULT_EMBEDDING_API_URL.to_string()),
            cohere_api_key: optional_env("COHERE_API_KEY"),
            video_analysis_url: optional_env("VIDEO_ANALYSIS_URL")
                .unwrap_or_else(|| DEFAULT_VIDEO_ANALYSIS_URL.to_string()),
            github_token: optional_env("GITHUB_TOKEN"),
            enable_custom_rag: parse_flag(optional_env("ENABLE_CUSTOM_RAG").as_deref(), true),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Unset and blank values are treated the same.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub(crate) fn parse_flag(value: Option<&str>, default: bool) -> bool {
    match value.map(|v| v.to_ascii_lowercase()) {
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => true,
        Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => false,
        _ => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag_truthy_values() {
        assert!(parse_flag(Some("true"), false));
        assert!(parse_flag(Some("1"), false));
        assert!(parse_flag(Some("ON"), false));
    }

    #[test]
    fn test_parse_flag_falsy_values() {
        assert!(!parse_flag(Some("false"), true));
        assert!(!parse_flag(Some("0"), true));
    }

    #[test]
    fn test_parse_flag_unknown_falls_back_to_default() {
        assert!(parse_flag(None, true));
        assert!(!parse_flag(Some("maybe"), false));
    }
}
