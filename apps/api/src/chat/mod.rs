//! Chat endpoints: a general assistant, a recruiter assistant grounded in
//! candidate resumes, and a student "digital twin".

pub mod community;
pub mod handlers;
pub mod prompts;
pub mod twin;

use crate::errors::AppError;
use crate::llm_client::{validate_history, ChatMessage, LlmError};

/// Client-supplied histories must be non-empty and use known roles.
pub fn validate_messages(messages: &[ChatMessage]) -> Result<(), AppError> {
    if messages.is_empty() {
        return Err(AppError::Validation("messages cannot be empty".to_string()));
    }
    validate_history(messages).map_err(|e| match e {
        LlmError::InvalidRole(role) => AppError::Validation(format!(
            "Invalid role '{role}': expected user, assistant or system"
        )),
        other => AppError::from(other),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_messages() {
        assert!(matches!(
            validate_messages(&[]),
            Err(AppError::Validation(_))
        ));
        assert!(validate_messages(&[ChatMessage::user("hi")]).is_ok());

        let bad = ChatMessage {
            role: "bot".to_string(),
            content: "hi".to_string(),
        };
        match validate_messages(&[bad]) {
            Err(AppError::Validation(msg)) => assert!(msg.contains("'bot'")),
            other => panic!("expected Validation, got {other:?}"),
        }
    }
}
