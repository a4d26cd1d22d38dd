use pdf_extract::extract_text_from_mem_by_pages;
use tracing::debug;

use super::ExtractError;

/// Extracts the text of every page, in page order, each followed by a newline.
/// Pages without a text layer (scanned images) contribute an empty line; there is no OCR.
pub fn extract_text(bytes: &[u8]) -> Result<String, ExtractError> {
    let pages = extract_text_from_mem_by_pages(bytes).map_err(|e| ExtractError::Pdf(e.to_string()))?;
    debug!("PDF has {} pages", pages.len());
    Ok(join_pages(&pages))
}

fn join_pages<S: AsRef<str>>(pages: &[S]) -> String {
    let mut text = String::new();
    for page in pages {
        text.push_str(page.as_ref());
        text.push('\n');
    }
    text
}
