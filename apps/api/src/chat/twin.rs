//! Digital twin: a chat assistant that represents one student, grounded in
//! their resume and GitHub portfolio.

use uuid::Uuid;

use crate::chat::prompts::TWIN_SYSTEM_TEMPLATE;
use crate::errors::AppError;
use crate::github::store::{search_github_documents, GithubDocumentHit};
use crate::llm_client::prompts::GROUNDING_INSTRUCTION;
use crate::llm_client::ChatMessage;
use crate::profiles::get_profile;
use crate::resume::store::get_resume_by_student_id;
use crate::state::AppState;

pub const TWIN_GITHUB_DOCS: usize = 5;
const TWIN_RESUME_CHARS: usize = 4000;

/// The text the portfolio search runs against: the latest user turn, or the
/// latest turn of any role when the user has not spoken.
pub fn retrieval_query(messages: &[ChatMessage]) -> Option<&str> {
    messages
        .iter()
        .rev()
        .find(|m| m.role == "user")
        .or_else(|| messages.last())
        .map(|m| m.content.as_str())
}

/// Builds the twin's system prompt from whatever context the student has.
pub fn build_twin_system(
    name: &str,
    resume_text: Option<&str>,
    github_docs: &[GithubDocumentHit],
) -> String {
    let mut sections = Vec::new();
    if let Some(resume) = resume_text {
        let excerpt: String = resume.chars().take(TWIN_RESUME_CHARS).collect();
        sections.push(format!("Resume:\n{excerpt}"));
    }
    if !github_docs.is_empty() {
        let docs = github_docs
            .iter()
            .map(|d| d.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        sections.push(format!("GitHub projects:\n{docs}"));
    }

    let system = TWIN_SYSTEM_TEMPLATE
        .replace("{name}", name)
        .replace("{context}", &sections.join("\n\n"));
    format!("{system}\n{GROUNDING_INSTRUCTION}")
}

/// Answers the conversation on behalf of `student_id`.
/// `NotFound` when the student has neither a resume nor GitHub documents.
pub async fn answer_as_twin(
    state: &AppState,
    student_id: Uuid,
    messages: &[ChatMessage],
    temperature: f32,
) -> Result<String, AppError> {
    let resume = get_resume_by_student_id(&state.db, student_id).await?;

    let github_docs = match retrieval_query(messages).filter(|q| !q.trim().is_empty()) {
        Some(query) => {
            let query_embedding = state.embedder.embed(query).await?;
            search_github_documents(&state.db, student_id, &query_embedding, TWIN_GITHUB_DOCS)
                .await?
        }
        None => vec![],
    };

    if resume.is_none() && github_docs.is_empty() {
        return Err(AppError::NotFound(
            "No resume or GitHub portfolio found for this student".to_string(),
        ));
    }

    let name = get_profile(&state.db, student_id)
        .await?
        .and_then(|p| p.name)
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| "this student".to_string());

    let system = build_twin_system(
        &name,
        resume.as_ref().map(|r| r.resume_text.as_str()),
        &github_docs,
    );
    Ok(state.llm.chat(&system, messages, temperature).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_retrieval_query_prefers_last_user_turn() {
        let messages = vec![
            ChatMessage::user("What did they build?"),
            ChatMessage {
                role: "assistant".to_string(),
                content: "A compiler.".to_string(),
            },
        ];
        assert_eq!(retrieval_query(&messages), Some("What did they build?"));
        assert_eq!(retrieval_query(&[]), None);
    }

    #[test]
    fn test_twin_system_includes_available_context() {
        let docs = vec![GithubDocumentHit {
            id: "x".to_string(),
            text: "Repository: tiny-db".to_string(),
            metadata: json!({}),
            similarity: 0.9,
        }];

        let system = build_twin_system("Ada", Some("Rust developer"), &docs);
        assert!(system.contains("digital twin of Ada"));
        assert!(system.contains("Resume:\nRust developer"));
        assert!(system.contains("GitHub projects:\nRepository: tiny-db"));

        let resume_only = build_twin_system("Ada", Some("Rust developer"), &[]);
        assert!(!resume_only.contains("GitHub projects"));
    }
}
