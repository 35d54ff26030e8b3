pub mod cover_letter;
pub mod handlers;
pub mod prompts;
