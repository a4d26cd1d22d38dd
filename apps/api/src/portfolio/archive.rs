//! Archive Packager — writes the generated site into an in-memory ZIP.
//!
//! Entry names are part of the download contract: `index.html`, `style.css`,
//! `script.js`, flat, nothing else.

use std::io::{Cursor, Write};

use thiserror::Error;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::portfolio::blocks::GeneratedSite;

pub const ARCHIVE_FILE_NAME: &str = "portfolio_website.zip";
pub const ARCHIVE_CONTENT_TYPE: &str = "application/zip";

pub const HTML_ENTRY: &str = "index.html";
pub const CSS_ENTRY: &str = "style.css";
pub const JS_ENTRY: &str = "script.js";

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("ZIP error: {0}")]
    Zip(#[from] ZipError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Packs `site` into ZIP bytes, one entry per file, default deflate compression.
pub fn package(site: &GeneratedSite) -> Result<Vec<u8>, ArchiveError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    for (name, content) in [
        (HTML_ENTRY, &site.html),
        (CSS_ENTRY, &site.css),
        (JS_ENTRY, &site.js),
    ] {
        zip.start_file(name, options)?;
        zip.write_all(content.as_bytes())?;
    }

    Ok(zip.finish()?.into_inner())
}
