//! Text Extractor — turns an uploaded resume (PDF or DOCX) into plain text.
//!
//! Extraction is CPU-bound; async callers go through `extract_document`, which
//! runs the parser on the blocking pool.

pub mod docx;
pub mod pdf;

use bytes::Bytes;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

pub const PDF_MIME: &str = "application/pdf";
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// The two accepted upload formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Docx,
}

impl DocumentFormat {
    /// Resolves the format of an upload. Precedence: declared MIME type,
    /// then file extension, then magic bytes. `None` means unsupported.
    pub fn detect(content_type: Option<&str>, file_name: Option<&str>, bytes: &[u8]) -> Option<Self> {
        content_type
            .and_then(Self::from_mime)
            .or_else(|| file_name.and_then(Self::from_extension))
            .or_else(|| Self::from_magic(bytes))
    }

    fn from_mime(content_type: &str) -> Option<Self> {
        let essence = content_type.split(';').next().unwrap_or_default().trim();
        if essence.eq_ignore_ascii_case(PDF_MIME) {
            Some(DocumentFormat::Pdf)
        } else if essence.eq_ignore_ascii_case(DOCX_MIME) {
            Some(DocumentFormat::Docx)
        } else {
            None
        }
    }

    fn from_extension(file_name: &str) -> Option<Self> {
        let (_, ext) = file_name.rsplit_once('.')?;
        if ext.eq_ignore_ascii_case("pdf") {
            Some(DocumentFormat::Pdf)
        } else if ext.eq_ignore_ascii_case("docx") {
            Some(DocumentFormat::Docx)
        } else {
            None
        }
    }

    fn from_magic(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(b"%PDF-") {
            Some(DocumentFormat::Pdf)
        } else if bytes.starts_with(b"PK\x03\x04") {
            Some(DocumentFormat::Docx)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Docx => "docx",
        }
    }
}

/// The document could not be read as the declared format.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Invalid PDF: {0}")]
    Pdf(String),

    #[error("Invalid DOCX container: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("DOCX is missing the {0} part")]
    MissingPart(&'static str),

    #[error("Invalid DOCX XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Failed to read DOCX part: {0}")]
    Io(#[from] std::io::Error),

    #[error("Document parser aborted: {0}")]
    Aborted(String),
}

/// One uploaded file, already classified. Lives for a single request.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub file_name: Option<String>,
    pub format: DocumentFormat,
    pub bytes: Bytes,
}

/// Extracts the plain text of `bytes`, read as `format`.
pub fn extract(bytes: &[u8], format: DocumentFormat) -> Result<String, ExtractError> {
    match format {
        DocumentFormat::Pdf => pdf::extract_text(bytes),
        DocumentFormat::Docx => docx::extract_text(bytes),
    }
}

/// Runs `extract` on the blocking pool. A parser panic is reported as
/// `ExtractError::Aborted` instead of taking the worker down.
pub async fn extract_document(document: &UploadedDocument) -> Result<String, ExtractError> {
    let bytes = document.bytes.clone();
    let format = document.format;

    let text = tokio::task::spawn_blocking(move || extract(&bytes, format))
        .await
        .map_err(|e| ExtractError::Aborted(e.to_string()))??;

    info!(
        "Extracted {} chars from {} upload {:?}",
        text.chars().count(),
        format.as_str(),
        document.file_name
    );
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_prefers_declared_mime() {
        let format = DocumentFormat::detect(Some(PDF_MIME), Some("resume.docx"), b"PK\x03\x04");
        assert_eq!(format, Some(DocumentFormat::Pdf));
    }

    #[test]
    fn test_detect_mime_ignores_parameters_and_case() {
        let format = DocumentFormat::detect(Some("Application/PDF; charset=binary"), None, b"");
        assert_eq!(format, Some(DocumentFormat::Pdf));
        let format = DocumentFormat::detect(Some(DOCX_MIME), None, b"");
        assert_eq!(format, Some(DocumentFormat::Docx));
    }

    #[test]
    fn test_detect_falls_back_to_extension() {
        let format =
            DocumentFormat::detect(Some("application/octet-stream"), Some("CV.DOCX"), b"");
        assert_eq!(format, Some(DocumentFormat::Docx));
        let format = DocumentFormat::detect(None, Some("jane.doe.pdf"), b"");
        assert_eq!(format, Some(DocumentFormat::Pdf));
    }

    #[test]
    fn test_detect_falls_back_to_magic_bytes() {
        assert_eq!(
            DocumentFormat::detect(None, Some("upload"), b"%PDF-1.7\n..."),
            Some(DocumentFormat::Pdf)
        );
        assert_eq!(
            DocumentFormat::detect(None, None, b"PK\x03\x04rest"),
            Some(DocumentFormat::Docx)
        );
    }

    #[test]
    fn test_detect_rejects_other_formats() {
        assert_eq!(
            DocumentFormat::detect(Some("text/plain"), Some("resume.txt"), b"Jane Doe"),
            None
        );
        assert_eq!(DocumentFormat::detect(None, Some("resume.doc"), b"\xd0\xcf\x11\xe0"), None);
    }

    #[test]
    fn test_format_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&DocumentFormat::Docx).unwrap(), r#""docx""#);
        assert_eq!(DocumentFormat::Pdf.as_str(), "pdf");
    }

    #[test]
    fn test_extract_rejects_zip_bytes_that_are_not_docx() {
        assert!(matches!(
            extract(b"not a zip", DocumentFormat::Docx),
            Err(ExtractError::Zip(_))
        ));
    }

    #[tokio::test]
    async fn test_extract_document_reports_truncated_pdf_as_error() {
        let document = UploadedDocument {
            file_name: Some("resume.pdf".to_string()),
            format: DocumentFormat::Pdf,
            bytes: Bytes::from_static(b"%PDF-1.5\n1 0 obj\n<< /Type /Catalog"),
        };
        assert!(extract_document(&document).await.is_err());
    }

    #[tokio::test]
    async fn test_extract_document_reads_docx_on_blocking_pool() {
        let document = UploadedDocument {
            file_name: Some("resume.docx".to_string()),
            format: DocumentFormat::Docx,
            bytes: Bytes::from(docx::fixture(&["Jane Doe", "Software Engineer"])),
        };
        let text = extract_document(&document).await.unwrap();
        assert_eq!(text, "Jane Doe\nSoftware Engineer");
    }
}
