//! Portfolio generation — orchestrates the full pipeline for one upload.
//!
//! Flow: extract text → structure (LLM #1) → generate_code (LLM #2) →
//!       parse blocks → package ZIP → return site, preview and archive.
//!
//! Strictly sequential. Any extraction or model error aborts the request and no
//! archive is produced. Missing code blocks do not abort; they become warnings.

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::extract::{extract_document, UploadedDocument};
use crate::llm_client::LanguageModel;
use crate::portfolio::archive::package;
use crate::portfolio::blocks::{parse_site, GeneratedSite, OutputWarning};
use crate::portfolio::builder::{generate_code, structure};
use crate::portfolio::theme::Theme;

/// Everything one generation run produced.
#[derive(Debug, Clone)]
pub struct Portfolio {
    pub generation_id: Uuid,
    pub theme: Theme,
    pub resume_text: String,
    pub structured_spec: String,
    pub site: GeneratedSite,
    pub warnings: Vec<OutputWarning>,
    /// ZIP bytes: `index.html`, `style.css`, `script.js`.
    pub archive: Vec<u8>,
    pub generated_at: DateTime<Utc>,
}

impl Portfolio {
    /// The HTML handed to the preview surface, unmodified.
    pub fn preview_html(&self) -> &str {
        &self.site.html
    }
}

/// Runs the whole pipeline on an uploaded resume.
///
/// Extraction finishes (or fails) before any model call is attempted.
pub async fn generate_portfolio(
    llm: &dyn LanguageModel,
    document: &UploadedDocument,
    theme: Theme,
) -> Result<Portfolio, AppError> {
    let resume_text = extract_document(document).await?;
    generate_from_text(llm, resume_text, theme).await
}

/// Runs the model stages, parsing and packaging on already-extracted resume text.
pub async fn generate_from_text(
    llm: &dyn LanguageModel,
    resume_text: String,
    theme: Theme,
) -> Result<Portfolio, AppError> {
    let generation_id = Uuid::new_v4();
    info!(
        "Generation {generation_id}: starting (theme={theme}, model={})",
        llm.model_name()
    );

    // Step 1: structure the resume content
    let structured_spec = structure(llm, &resume_text, theme).await?;

    // Step 2: generate the site code from the structured content
    let raw_code = generate_code(llm, &structured_spec, theme).await?;

    // Step 3: pull out the three blocks
    let parsed = parse_site(&raw_code);
    for warning in &parsed.warnings {
        warn!("Generation {generation_id}: {}", warning.message);
    }

    // Step 4: package
    let archive = package(&parsed.site)?;
    info!(
        "Generation {generation_id}: packaged {} byte archive ({} warnings)",
        archive.len(),
        parsed.warnings.len()
    );

    Ok(Portfolio {
        generation_id,
        theme,
        resume_text,
        structured_spec,
        site: parsed.site,
        warnings: parsed.warnings,
        archive,
        generated_at: Utc::now(),
    })
}
