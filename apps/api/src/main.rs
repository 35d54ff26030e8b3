mod applications;
mod chat;
mod config;
mod db;
mod embedding;
mod errors;
mod github;
mod llm_client;
mod matching;
mod models;
mod personality;
mod profiles;
mod resume;
mod routes;
mod schedule;
mod state;
mod student;

use anyhow::Result;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::embedding::{CachedEmbedder, Embedder, HfEmbedder};
use crate::github::GitHubClient;
use crate::llm_client::LlmClient;
use crate::matching::reranker::{CohereReranker, Reranker, SimilarityReranker};
use crate::personality::HttpVideoAnalyzer;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Recruit API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Initialize Redis (connections are opened lazily by the embedding cache)
    let redis = redis::Client::open(config.redis_url.clone())?;
    info!("Redis client initialized");

    // Initialize S3 / MinIO
    let s3 = build_s3_client(&config).await;
    info!("S3 client initialized");

    // Initialize LLM client
    let llm = LlmClient::new(config.llm_api_url.clone(), config.hf_api_key.clone())?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Embeddings: Hugging Face behind the Redis cache
    let hf_embedder = HfEmbedder::new(config.embedding_api_url.clone(), config.hf_api_key.clone())?;
    let embedder: Arc<dyn Embedder> = Arc::new(CachedEmbedder::new(Arc::new(hf_embedder), redis));
    info!("Embedder initialized (model: {})", embedder.model_name());

    // Reranker: Cohere when a key is configured
    let reranker: Arc<dyn Reranker> = match &config.cohere_api_key {
        Some(key) => Arc::new(CohereReranker::new(key.clone())?),
        None => Arc::new(SimilarityReranker),
    };
    info!("Reranker initialized ({})", reranker.name());

    let video_analyzer = Arc::new(HttpVideoAnalyzer::new(config.video_analysis_url.clone())?);
    let github = GitHubClient::new(config.github_token.clone())?;

    // Build app state
    let state = AppState {
        db,
        s3,
        llm,
        http: reqwest::Client::new(),
        embedder,
        reranker,
        video_analyzer,
        github,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(config: &Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &config.aws_access_key_id,
        &config.aws_secret_access_key,
        None,
        None,
        "recruit-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(&config.s3_endpoint)
        .load()
        .await;

    // Path-style addressing for MinIO.
    let s3_config = aws_sdk_s3::config::Builder::from(&s3_config)
        .force_path_style(true)
        .build();

    aws_sdk_s3::Client::from_conf(s3_config)
}
