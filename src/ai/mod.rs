pub mod fallback;
pub mod gemini;
pub mod prompts;
