// Shared prompt fragments.
// Each service that needs LLM calls defines its own prompts.rs alongside it.

/// Default system prompt for the open-ended assistant endpoints.
pub const GENERAL_ASSISTANT_SYSTEM: &str = "You are a helpful assistant.";

/// Appended to prompts whose output is shown verbatim in the product UI.
pub const PLAIN_OUTPUT_INSTRUCTION: &str = "\
    Return only the requested text. \
    Do NOT add preambles such as 'Here is', closing remarks, or explanations of what you did.";

/// Appended to prompts built from retrieved resume or portfolio context.
pub const GROUNDING_INSTRUCTION: &str = "\
    Only state facts that appear in the provided context. \
    If the context does not cover something, say so instead of guessing.";
