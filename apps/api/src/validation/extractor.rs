//! Text extractor: PDF bytes to plain text, best effort.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Could not read uploaded file '{path}': {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Placeholder used when the text layer cannot be extracted. Treated as valid text.
pub fn unavailable_placeholder(byte_len: usize) -> String {
    format!("[PDF text extraction unavailable: {byte_len} bytes]")
}

/// Reads the file at `path` and extracts its text.
///
/// Only an unreadable file is an error; a document whose text cannot be extracted
/// yields [`unavailable_placeholder`].
pub async fn read_pdf_text(path: &Path) -> Result<String, ExtractionError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| ExtractionError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;

    let byte_len = bytes.len();
    // pdf-extract is CPU-bound and may panic on malformed input.
    let text = match tokio::task::spawn_blocking(move || extract_text(&bytes)).await {
        Ok(text) => text,
        Err(e) => {
            warn!("PDF extraction task aborted for {}: {e}", path.display());
            unavailable_placeholder(byte_len)
        }
    };

    info!(
        "Extracted {} chars from {} ({byte_len} bytes)",
        text.len(),
        path.display()
    );
    Ok(text)
}

/// Extracts the text layer from in-memory PDF bytes.
pub fn extract_text(bytes: &[u8]) -> String {
    match pdf_extract::extract_text_from_mem(bytes) {
        Ok(text) => tidy(&text),
        Err(e) => {
            warn!("PDF text extraction failed: {e}");
            unavailable_placeholder(bytes.len())
        }
    }
}

/// Postgres `TEXT` rejects NUL, which some glyph maps emit.
fn tidy(text: &str) -> String {
    text.replace('\0', "").trim().to_string()
}
