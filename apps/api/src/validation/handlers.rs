//! Axum route handlers for the submission API.

use std::path::Path as FsPath;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::submission::Submission;
use crate::state::AppState;
use crate::store::MAX_LIST_LIMIT;
use crate::validation::pipeline::{SubmissionOutcome, SubmissionRequest};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<u32>,
}

/// POST /api/submissions
///
/// Runs the validation pipeline for a PDF previously stored via `/api/uploads`.
pub async fn handle_submit(
    State(state): State<AppState>,
    Json(request): Json<SubmissionRequest>,
) -> Result<Json<SubmissionOutcome>, AppError> {
    if request.pdf_path.trim().is_empty() {
        return Err(AppError::Validation("pdfPath cannot be empty".to_string()));
    }
    if !state.uploads.contains(FsPath::new(&request.pdf_path)) {
        return Err(AppError::Validation(
            "pdfPath must reference a file returned by /api/uploads".to_string(),
        ));
    }

    let outcome = state.pipeline.run(request).await?;
    Ok(Json(outcome))
}

/// GET /api/submissions?limit=N
///
/// Newest first. Without `limit` every submission is returned.
pub async fn handle_list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Submission>>, AppError> {
    let limit = query.limit.map(|l| l.min(MAX_LIST_LIMIT));
    Ok(Json(state.store.list_recent(limit).await?))
}

/// GET /api/submissions/:id
///
/// Returns `null` when no submission has this id.
pub async fn handle_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Option<Submission>>, AppError> {
    let id = Uuid::parse_str(&id)
        .map_err(|_| AppError::Validation(format!("'{id}' is not a valid submission id")))?;
    Ok(Json(state.store.get(id).await?))
}
