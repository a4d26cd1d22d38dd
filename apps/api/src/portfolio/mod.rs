// Portfolio generation: resume text → two LLM stages → code blocks → ZIP.
// All model calls go through llm_client — no direct Gemini calls here.

pub mod archive;
pub mod blocks;
pub mod builder;
pub mod handlers;
pub mod pipeline;
pub mod prompts;
pub mod theme;
