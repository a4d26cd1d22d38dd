//! Prompt Builder — the two model stages of the pipeline.
//!
//! Each stage is one model call, no retry. Stage 2 embeds stage 1's output, so the
//! orchestrator must finish `structure` before calling `generate_code`.

use tracing::info;

use crate::llm_client::{LanguageModel, LlmError};
use crate::portfolio::prompts::{CODE_PROMPT_TEMPLATE, STRUCTURE_PROMPT_TEMPLATE};
use crate::portfolio::theme::Theme;

pub fn build_structure_prompt(resume_text: &str, theme: Theme) -> String {
    STRUCTURE_PROMPT_TEMPLATE
        .replace("{theme}", theme.label())
        .replace("{resume_text}", resume_text)
}

pub fn build_code_prompt(structured_spec: &str, theme: Theme) -> String {
    CODE_PROMPT_TEMPLATE
        .replace("{theme}", theme.label())
        .replace("{structured_spec}", structured_spec)
}

/// Stage 1: asks the model to organise the resume into website sections.
/// The reply is free-form prose; its shape is not checked.
pub async fn structure(
    llm: &dyn LanguageModel,
    resume_text: &str,
    theme: Theme,
) -> Result<String, LlmError> {
    let prompt = build_structure_prompt(resume_text, theme);
    let structured = llm.invoke(&prompt).await?;
    info!(
        "Structured resume content: {} chars (theme={theme})",
        structured.len()
    );
    Ok(structured)
}

/// Stage 2: asks the model for the site as three fenced `html` / `css` / `js` blocks.
/// Returns the raw reply; block extraction happens in `blocks`.
pub async fn generate_code(
    llm: &dyn LanguageModel,
    structured_spec: &str,
    theme: Theme,
) -> Result<String, LlmError> {
    let prompt = build_code_prompt(structured_spec, theme);
    let raw = llm.invoke(&prompt).await?;
    info!("Generated site code: {} chars (theme={theme})", raw.len());
    Ok(raw)
}
