//! Axum route handlers for the Chat API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::chat::community::{answer_recruiter_query, CommunityRetrieval};
use crate::chat::twin::answer_as_twin;
use crate::chat::validate_messages;
use crate::errors::AppError;
use crate::llm_client::prompts::GENERAL_ASSISTANT_SYSTEM;
use crate::llm_client::{ChatMessage, DEFAULT_TEMPERATURE};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

fn default_message() -> String {
    "hi".to_string()
}

fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default = "default_message")]
    pub message: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

#[derive(Debug, Deserialize)]
pub struct ChatHistoryRequest {
    pub messages: Vec<ChatMessage>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

#[derive(Debug, Deserialize)]
pub struct TwinRequest {
    pub student_id: Uuid,
    pub messages: Vec<ChatMessage>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /chat
pub async fn handle_chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let response = state
        .llm
        .generate_text(GENERAL_ASSISTANT_SYSTEM, &request.message, request.temperature)
        .await?;
    Ok(Json(ChatResponse { response }))
}

/// POST /chat/community
///
/// Recruiter assistant. Retrieves the closest candidates for the request and
/// asks the model for a fit score and next step per candidate.
pub async fn handle_community_chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    if request.message.trim().is_empty() {
        return Err(AppError::Validation("message cannot be empty".to_string()));
    }

    let retrieval = CommunityRetrieval {
        pool: &state.db,
        embedder: state.embedder.as_ref(),
        reranker: state.reranker.as_ref(),
        use_custom_rag: state.config.enable_custom_rag,
    };
    let response =
        answer_recruiter_query(retrieval, &state.llm, &request.message, request.temperature)
            .await?;
    Ok(Json(ChatResponse { response }))
}

/// POST /chat/chat_with_history
pub async fn handle_chat_with_history(
    State(state): State<AppState>,
    Json(request): Json<ChatHistoryRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    validate_messages(&request.messages)?;
    let response = state
        .llm
        .chat(GENERAL_ASSISTANT_SYSTEM, &request.messages, request.temperature)
        .await?;
    Ok(Json(ChatResponse { response }))
}

/// POST /chat/twin
pub async fn handle_twin_chat(
    State(state): State<AppState>,
    Json(request): Json<TwinRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    validate_messages(&request.messages)?;
    let response = answer_as_twin(
        &state,
        request.student_id,
        &request.messages,
        request.temperature,
    )
    .await?;
    Ok(Json(ChatResponse { response }))
}
