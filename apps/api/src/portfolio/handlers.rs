//! Axum route handlers for the Portfolio API.
//!
//! Upload endpoints take `multipart/form-data` with a `file` field (PDF or DOCX)
//! and an optional `theme` field (defaults to `Modern`).

use axum::{
    extract::{Multipart, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::extract::{extract_document, DocumentFormat, UploadedDocument};
use crate::portfolio::archive::{ARCHIVE_CONTENT_TYPE, ARCHIVE_FILE_NAME};
use crate::portfolio::blocks::{GeneratedSite, OutputWarning};
use crate::portfolio::pipeline::{generate_portfolio, Portfolio};
use crate::portfolio::theme::Theme;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ThemesResponse {
    pub themes: Vec<Theme>,
    pub default: Theme,
}

#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub file_name: Option<String>,
    pub format: DocumentFormat,
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ArchiveDownload {
    pub file_name: &'static str,
    pub content_type: &'static str,
    pub size_bytes: usize,
    pub data_base64: String,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub generation_id: Uuid,
    pub theme: Theme,
    pub model: String,
    pub resume_text: String,
    pub structured_spec: String,
    pub site: GeneratedSite,
    pub preview_html: String,
    pub warnings: Vec<OutputWarning>,
    pub archive: ArchiveDownload,
    pub generated_at: DateTime<Utc>,
}

/// A parsed upload form.
struct UploadForm {
    document: UploadedDocument,
    theme: Theme,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/themes
pub async fn handle_list_themes() -> Json<ThemesResponse> {
    Json(ThemesResponse {
        themes: Theme::ALL.to_vec(),
        default: Theme::default(),
    })
}

/// POST /api/v1/resumes/extract
///
/// Returns the plain text extracted from the uploaded resume. No model call.
pub async fn handle_extract(multipart: Multipart) -> Result<Json<ExtractResponse>, AppError> {
    let form = read_upload_form(multipart).await?;
    let text = extract_document(&form.document).await?;

    Ok(Json(ExtractResponse {
        file_name: form.document.file_name,
        format: form.document.format,
        text,
    }))
}

/// POST /api/v1/portfolio/generate
///
/// Full pipeline: extract → structure → generate code → parse → package.
/// Returns the site, the preview HTML, any output warnings and the archive as base64.
pub async fn handle_generate(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<GenerateResponse>, AppError> {
    let form = read_upload_form(multipart).await?;
    let portfolio = generate_portfolio(state.llm.as_ref(), &form.document, form.theme).await?;

    Ok(Json(GenerateResponse::new(
        portfolio,
        state.llm.model_name().to_string(),
    )))
}

/// POST /api/v1/portfolio/download
///
/// Same pipeline as `generate`, but answers with the ZIP itself as an attachment.
///
/// This is a fresh generation: both model calls run again, so the archive is not
/// the one behind an earlier `generate` preview. Clients that want the previewed
/// site should decode `archive.data_base64` from the `generate` response instead.
pub async fn handle_download(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let form = read_upload_form(multipart).await?;
    let portfolio = generate_portfolio(state.llm.as_ref(), &form.document, form.theme).await?;

    let headers = [
        (header::CONTENT_TYPE, ARCHIVE_CONTENT_TYPE.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{ARCHIVE_FILE_NAME}\""),
        ),
    ];
    let extra = [
        ("x-generation-id", portfolio.generation_id.to_string()),
        ("x-output-warnings", portfolio.warnings.len().to_string()),
    ];

    Ok((headers, extra, portfolio.archive).into_response())
}

impl GenerateResponse {
    fn new(portfolio: Portfolio, model: String) -> Self {
        let preview_html = portfolio.preview_html().to_string();
        let archive = ArchiveDownload {
            file_name: ARCHIVE_FILE_NAME,
            content_type: ARCHIVE_CONTENT_TYPE,
            size_bytes: portfolio.archive.len(),
            data_base64: BASE64.encode(&portfolio.archive),
        };

        GenerateResponse {
            generation_id: portfolio.generation_id,
            theme: portfolio.theme,
            model,
            resume_text: portfolio.resume_text,
            structured_spec: portfolio.structured_spec,
            preview_html,
            site: portfolio.site,
            warnings: portfolio.warnings,
            archive,
            generated_at: portfolio.generated_at,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Upload parsing
// ────────────────────────────────────────────────────────────────────────────

async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut document = None;
    let mut theme = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await?;
                document = Some(classify_upload(file_name, content_type.as_deref(), bytes)?);
            }
            Some("theme") => theme = Some(field.text().await?),
            // other fields are ignored
            _ => {}
        }
    }

    let document = document
        .ok_or_else(|| AppError::Validation("multipart field 'file' is required".to_string()))?;
    let theme = match theme {
        Some(label) => label
            .parse::<Theme>()
            .map_err(|e| AppError::Validation(e.to_string()))?,
        None => Theme::default(),
    };

    Ok(UploadForm { document, theme })
}

fn classify_upload(
    file_name: Option<String>,
    content_type: Option<&str>,
    bytes: Bytes,
) -> Result<UploadedDocument, AppError> {
    if bytes.is_empty() {
        return Err(AppError::Validation("uploaded file is empty".to_string()));
    }

    let format = DocumentFormat::detect(content_type, file_name.as_deref(), &bytes)
        .ok_or_else(|| {
            AppError::UnsupportedFormat(format!(
                "'{}' ({})",
                file_name.as_deref().unwrap_or("upload"),
                content_type.unwrap_or("no content type")
            ))
        })?;

    Ok(UploadedDocument {
        file_name,
        format,
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{DOCX_MIME, PDF_MIME};

    #[test]
    fn test_classify_upload_uses_declared_type() {
        let doc = classify_upload(
            Some("resume.bin".to_string()),
            Some(PDF_MIME),
            Bytes::from_static(b"%PDF-1.4"),
        )
        .unwrap();
        assert_eq!(doc.format, DocumentFormat::Pdf);
        assert_eq!(doc.file_name.as_deref(), Some("resume.bin"));
    }

    #[test]
    fn test_classify_upload_rejects_empty_file() {
        let err = classify_upload(Some("a.pdf".to_string()), Some(PDF_MIME), Bytes::new())
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_classify_upload_rejects_unknown_format() {
        let err = classify_upload(
            Some("resume.txt".to_string()),
            Some("text/plain"),
            Bytes::from_static(b"Jane Doe"),
        )
        .unwrap_err();
        match err {
            AppError::UnsupportedFormat(msg) => {
                assert!(msg.contains("resume.txt"));
                assert!(msg.contains("text/plain"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_generate_response_carries_preview_and_encoded_archive() {
        let portfolio = Portfolio {
            generation_id: Uuid::new_v4(),
            theme: Theme::Dark,
            resume_text: "Jane Doe".to_string(),
            structured_spec: "Name: Jane Doe".to_string(),
            site: GeneratedSite {
                html: "<h1>Jane</h1>".to_string(),
                css: "h1 {}".to_string(),
                js: "console.log(1);".to_string(),
            },
            warnings: Vec::new(),
            archive: vec![1, 2, 3],
            generated_at: Utc::now(),
        };

        let response = GenerateResponse::new(portfolio, "gemini-2.5-flash".to_string());
        assert_eq!(response.preview_html, "<h1>Jane</h1>");
        assert_eq!(response.site.html, response.preview_html);
        assert_eq!(response.structured_spec, "Name: Jane Doe");
        assert_eq!(response.archive.size_bytes, 3);
        assert_eq!(response.archive.data_base64, "AQID");
        assert_eq!(response.model, "gemini-2.5-flash");
    }

    #[test]
    fn test_classify_upload_docx_by_mime() {
        let doc = classify_upload(None, Some(DOCX_MIME), Bytes::from_static(b"PK\x03\x04"))
            .unwrap();
        assert_eq!(doc.format, DocumentFormat::Docx);
    }
}
