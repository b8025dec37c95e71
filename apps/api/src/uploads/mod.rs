//! Upload transport: accepts a PDF, enforces type and size, stores it on disk and
//! hands back its path and public URL.

use std::path::{Component, Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

pub mod handlers;

pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
pub const PDF_CONTENT_TYPE: &str = "application/pdf";
const MAX_FIELD_NAME_LEN: usize = 64;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Only PDF files are accepted (got '{0}')")]
    UnsupportedType(String),

    #[error("File exceeds the maximum size of {max} bytes")]
    TooLarge { max: usize },

    #[error("No file part found in upload")]
    MissingFile,

    #[error("Malformed multipart body: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),

    #[error("Failed to store upload: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredUpload {
    pub path: String,
    pub url: String,
    pub field_name: String,
    pub size: usize,
}

/// Filesystem location uploads are written to, and the URL prefix they are served under.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
    public_base_url: String,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>, public_base_url: &str) -> Self {
        Self {
            dir: dir.into(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// True when `path` names a file under the upload directory.
    pub fn contains(&self, path: &Path) -> bool {
        path.starts_with(&self.dir)
            && !path.components().any(|c| matches!(c, Component::ParentDir))
    }

    /// Writes an already size-checked PDF and returns where it lives.
    pub async fn save(
        &self,
        field_name: &str,
        content_type: Option<&str>,
        data: &[u8],
    ) -> Result<StoredUpload, UploadError> {
        check_content_type(content_type)?;
        check_size(data.len())?;

        tokio::fs::create_dir_all(&self.dir).await?;
        let field_name = sanitize_field_name(field_name);
        let file_name = format!("{field_name}-{}.pdf", Uuid::new_v4());
        let path = self.dir.join(&file_name);
        tokio::fs::write(&path, data).await?;

        info!("Stored upload {} ({} bytes)", path.display(), data.len());
        Ok(StoredUpload {
            path: path.to_string_lossy().into_owned(),
            url: format!("{}/uploads/{file_name}", self.public_base_url),
            field_name,
            size: data.len(),
        })
    }
}

/// Accepts `application/pdf`, ignoring case and parameters.
pub fn check_content_type(content_type: Option<&str>) -> Result<(), UploadError> {
    let content_type = content_type.unwrap_or("");
    let essence = content_type.split(';').next().unwrap_or("").trim();
    if essence.eq_ignore_ascii_case(PDF_CONTENT_TYPE) {
        Ok(())
    } else {
        Err(UploadError::UnsupportedType(content_type.to_string()))
    }
}

pub fn check_size(size: usize) -> Result<(), UploadError> {
    if size > MAX_UPLOAD_BYTES {
        return Err(UploadError::TooLarge {
            max: MAX_UPLOAD_BYTES,
        });
    }
    Ok(())
}

fn sanitize_field_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .take(MAX_FIELD_NAME_LEN)
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}
