//! Resume feedback and cover letter generation.
//!
//! Every function here is a single LLM round trip; retrieval of the resume
//! context happens in the handlers.

use crate::llm_client::prompts::PLAIN_OUTPUT_INSTRUCTION;
use crate::llm_client::{LlmClient, LlmError, DEFAULT_TEMPERATURE};
use crate::student::prompts::{
    COVER_LETTER_PROMPT_TEMPLATE, COVER_LETTER_SYSTEM_TEMPLATE, REFINE_COVER_LETTER_PROMPT_TEMPLATE,
    REFINE_COVER_LETTER_SYSTEM, RESUME_FEEDBACK_SYSTEM,
};

/// Placeholder signature used when the student's profile has no name.
pub const DEFAULT_STUDENT_NAME: &str = "[Your Name]";

pub async fn generate_resume_feedback(
    llm: &LlmClient,
    resume_text: &str,
) -> Result<String, LlmError> {
    llm.generate_text(RESUME_FEEDBACK_SYSTEM, resume_text, DEFAULT_TEMPERATURE)
        .await
}

pub async fn generate_cover_letter(
    llm: &LlmClient,
    job_description: &str,
    relevant_experiences: &[String],
    student_name: Option<&str>,
) -> Result<String, LlmError> {
    let (system, user) = build_cover_letter_prompts(job_description, relevant_experiences, student_name);
    llm.generate_text(&system, &user, DEFAULT_TEMPERATURE).await
}

pub async fn refine_cover_letter(
    llm: &LlmClient,
    original_letter: &str,
    instruction: &str,
) -> Result<String, LlmError> {
    let user = REFINE_COVER_LETTER_PROMPT_TEMPLATE
        .replace("{original_letter}", original_letter)
        .replace("{instruction}", instruction);
    let system = format!("{REFINE_COVER_LETTER_SYSTEM}\n{PLAIN_OUTPUT_INSTRUCTION}");
    llm.generate_text(&system, &user, DEFAULT_TEMPERATURE).await
}

/// Builds the (system, user) prompt pair for one job.
pub fn build_cover_letter_prompts(
    job_description: &str,
    relevant_experiences: &[String],
    student_name: Option<&str>,
) -> (String, String) {
    let name = student_name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(DEFAULT_STUDENT_NAME);

    let system = COVER_LETTER_SYSTEM_TEMPLATE.replace("{student_name}", name);
    let experiences = if relevant_experiences.is_empty() {
        "(no resume on file)".to_string()
    } else {
        format!("- {}", relevant_experiences.join("\n- "))
    };
    let user = COVER_LETTER_PROMPT_TEMPLATE
        .replace("{job_description}", job_description)
        .replace("{experiences}", &experiences);

    (system, user)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompts_carry_name_and_context() {
        let (system, user) = build_cover_letter_prompts(
            "Backend engineer, Rust",
            &["Built a Rust web service".to_string(), "Led a team".to_string()],
            Some("Ada Lovelace"),
        );
        assert!(system.contains("The student's name is Ada Lovelace."));
        assert!(system.contains("Dear Hiring Manager,"));
        assert!(user.contains("Backend engineer, Rust"));
        assert!(user.contains("- Built a Rust web service\n- Led a team"));
    }

    #[test]
    fn test_missing_or_blank_name_uses_placeholder() {
        let (system, _) = build_cover_letter_prompts("jd", &[], None);
        assert!(system.contains("[Your Name]"));

        let (system, user) = build_cover_letter_prompts("jd", &[], Some("  "));
        assert!(system.contains("[Your Name]"));
        assert!(user.contains("(no resume on file)"));
    }
}
