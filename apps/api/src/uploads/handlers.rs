use axum::extract::{Multipart, State};
use axum::Json;
use bytes::BytesMut;

use crate::errors::AppError;
use crate::state::AppState;
use crate::uploads::{check_content_type, StoredUpload, UploadError, MAX_UPLOAD_BYTES};

/// Text part that overrides the name the file is stored under.
const FIELD_NAME_PART: &str = "fieldName";

/// POST /api/uploads
///
/// Multipart body with one file part (PDF, at most 10 MB) and an optional
/// `fieldName` text part. The first file part wins; other parts are drained.
pub async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<StoredUpload>, AppError> {
    let mut field_name: Option<String> = None;
    let mut file: Option<(String, String, BytesMut)> = None;

    while let Some(mut field) = multipart.next_field().await.map_err(UploadError::from)? {
        let name = field.name().unwrap_or_default().to_string();

        if name == FIELD_NAME_PART {
            field_name = Some(field.text().await.map_err(UploadError::from)?);
            continue;
        }

        if field.file_name().is_none() || file.is_some() {
            while field.chunk().await.map_err(UploadError::from)?.is_some() {}
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        check_content_type(Some(&content_type))?;

        let mut data = BytesMut::new();
        while let Some(chunk) = field.chunk().await.map_err(UploadError::from)? {
            if data.len() + chunk.len() > MAX_UPLOAD_BYTES {
                return Err(UploadError::TooLarge {
                    max: MAX_UPLOAD_BYTES,
                }
                .into());
            }
            data.extend_from_slice(&chunk);
        }
        file = Some((name, content_type, data));
    }

    let (part_name, content_type, data) = file.ok_or(UploadError::MissingFile)?;
    let field_name = field_name.unwrap_or(part_name);

    let stored = state
        .uploads
        .save(&field_name, Some(&content_type), &data)
        .await?;
    Ok(Json(stored))
}
