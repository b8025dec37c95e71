use std::sync::Arc;

use crate::store::SubmissionStore;
use crate::uploads::UploadStore;
use crate::validation::pipeline::ValidationPipeline;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Read side of the submission store; the pipeline holds the same handle for writes.
    pub store: Arc<dyn SubmissionStore>,
    pub pipeline: ValidationPipeline,
    pub uploads: UploadStore,
}
