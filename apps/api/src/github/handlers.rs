//! Axum route handlers for GitHub portfolio ingestion.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::github::documents::{build_documents, GithubDocument};
use crate::github::store::upsert_github_documents;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PortfolioRequest {
    pub username: String,
    pub student_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct PortfolioResponse {
    pub documents: Vec<GithubDocument>,
}

/// POST /github/create
///
/// Fetches the user's repositories, turns them into overview and README
/// documents, embeds them and stores them against the student.
pub async fn handle_create_portfolio(
    State(state): State<AppState>,
    Json(request): Json<PortfolioRequest>,
) -> Result<Json<PortfolioResponse>, AppError> {
    let username = request.username.trim();
    if username.is_empty() {
        return Err(AppError::Validation("username cannot be empty".to_string()));
    }

    info!("Building GitHub portfolio for {username}");
    let repos = state.github.fetch_user_repos(username).await?;
    if repos.is_empty() {
        return Err(AppError::NotFound(
            "No repositories found for this user.".to_string(),
        ));
    }

    let documents = build_documents(&repos);
    info!(
        "Built {} documents from {} repositories",
        documents.len(),
        repos.len()
    );

    let texts: Vec<String> = documents.iter().map(|d| d.text.clone()).collect();
    let embeddings = state.embedder.embed_batch(&texts).await?;
    upsert_github_documents(&state.db, request.student_id, &documents, &embeddings).await?;

    Ok(Json(PortfolioResponse { documents }))
}
