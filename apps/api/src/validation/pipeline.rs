//! CV validation pipeline.
//!
//! Flow: read_pdf_text → store.create → build_validation_prompt → model round trip
//!       (with timeout) → normalize → store.attach_result.
//!
//! The submission is persisted before the model is called, so a slow or failing
//! provider only degrades the outcome. Unreadable files and store failures abort.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::llm_client::{ModelClient, ModelError};
use crate::models::submission::{NewSubmission, Submission};
use crate::store::{StoreError, SubmissionStore};
use crate::validation::extractor::{read_pdf_text, ExtractionError};
use crate::validation::models::{DeclaredFields, ValidationResult};
use crate::validation::normalizer::normalize;
use crate::validation::prompts::build_validation_prompt;

/// Inbound request: declared fields plus the location of an already-uploaded PDF.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRequest {
    #[serde(flatten)]
    pub fields: DeclaredFields,
    pub pdf_path: String,
    /// Public URL returned by the upload endpoint. Defaults to `pdf_path`.
    #[serde(default)]
    pub pdf_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionOutcome {
    pub success: bool,
    pub submission: Submission,
    pub validation_result: ValidationResult,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    ExtractionFailed(#[from] ExtractionError),

    #[error(transparent)]
    StoreFailure(#[from] StoreError),
}

/// Injected dependencies for one pipeline run.
#[derive(Clone)]
pub struct ValidationPipeline {
    store: Arc<dyn SubmissionStore>,
    model: Arc<dyn ModelClient>,
    model_timeout: Duration,
}

impl ValidationPipeline {
    pub fn new(
        store: Arc<dyn SubmissionStore>,
        model: Arc<dyn ModelClient>,
        model_timeout: Duration,
    ) -> Self {
        Self {
            store,
            model,
            model_timeout,
        }
    }

    pub async fn run(&self, request: SubmissionRequest) -> Result<SubmissionOutcome, PipelineError> {
        let SubmissionRequest {
            fields,
            pdf_path,
            pdf_url,
        } = request;

        // Step 1: Extract text. Nothing is stored if the file cannot be read.
        let pdf_text = read_pdf_text(&PathBuf::from(&pdf_path))
            .await
            .inspect_err(|e| error!("Aborting submission: {e}"))?;

        // Step 2: First write, outcome unset
        let created = self
            .store
            .create(NewSubmission {
                fields: fields.clone(),
                pdf_url: pdf_url.unwrap_or_else(|| pdf_path.clone()),
                pdf_content: Some(pdf_text.clone()),
            })
            .await
            .inspect_err(|e| error!("Aborting submission, create failed: {e}"))?;
        info!("Created submission {} from {pdf_path}", created.id);

        // Step 3-5: Prompt, model round trip, normalize
        let prompt = build_validation_prompt(&fields, &pdf_text);
        let result = normalize(self.call_model(&prompt).await);
        match result.error {
            Some(code) => warn!(
                "Submission {} validated in degraded mode: {}",
                created.id,
                code.as_str()
            ),
            None => info!(
                "Submission {} validated: is_valid={}",
                created.id, result.is_valid
            ),
        }

        // Step 6: Second write, outcome attached
        let submission = self
            .store
            .attach_result(created.id, &result)
            .await
            .inspect_err(|e| error!("Failed to attach result to {}: {e}", created.id))?;

        Ok(SubmissionOutcome {
            success: true,
            submission,
            validation_result: result,
        })
    }

    /// One model round trip bounded by the configured timeout. A timeout is a transport failure.
    async fn call_model(&self, prompt: &str) -> Result<String, ModelError> {
        match tokio::time::timeout(self.model_timeout, self.model.generate(prompt)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(ModelError::Transport(format!(
                "Model '{}' did not reply within {}s",
                self.model.model(),
                self.model_timeout.as_secs()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use async_trait::async_trait;
    use uuid::Uuid;

    use super::*;
    use crate::llm_client::test_support::ScriptedModel;
    use crate::store::MemorySubmissionStore;
    use crate::validation::extractor::test_support::minimal_pdf;
    use crate::validation::models::{FieldName, ValidationErrorCode};

    const JANE_REPLY: &str = r#"{"isValid":true,"matches":{"fullName":true,"email":true,"phone":true,"skills":true,"experience":true},"details":{"fullName":"Found.","email":"Found.","phone":"Found.","skills":"Go and SQL listed.","experience":"5 years backend."},"overallSummary":"All fields match."}"#;

    const TIMEOUT: Duration = Duration::from_secs(60);

    struct SlowModel;

    #[async_trait]
    impl ModelClient for SlowModel {
        fn model(&self) -> &str {
            "slow"
        }

        async fn generate(&self, _prompt: &str) -> Result<String, ModelError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(JANE_REPLY.to_string())
        }
    }

    struct UnavailableStore;

    #[async_trait]
    impl SubmissionStore for UnavailableStore {
        async fn create(&self, _submission: NewSubmission) -> Result<Submission, StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolTimedOut))
        }

        async fn attach_result(
            &self,
            id: Uuid,
            _result: &ValidationResult,
        ) -> Result<Submission, StoreError> {
            Err(StoreError::NotFound(id))
        }

        async fn get(&self, _id: Uuid) -> Result<Option<Submission>, StoreError> {
            Ok(None)
        }

        async fn list_recent(&self, _limit: Option<u32>) -> Result<Vec<Submission>, StoreError> {
            Ok(vec![])
        }
    }

    fn jane_request(pdf_path: &std::path::Path) -> SubmissionRequest {
        SubmissionRequest {
            fields: DeclaredFields {
                full_name: "Jane Doe".to_string(),
                email: "jane@x.com".to_string(),
                phone: "+15551234567".to_string(),
                skills: vec!["Go".to_string(), "SQL".to_string()],
                experience: "5 years backend.".to_string(),
            },
            pdf_path: pdf_path.to_string_lossy().into_owned(),
            pdf_url: Some("/uploads/jane.pdf".to_string()),
        }
    }

    fn uploaded_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&minimal_pdf("Jane Doe Go SQL 5 years backend experience"))
            .unwrap();
        file
    }

    #[tokio::test]
    async fn test_matching_reply_is_stored_verbatim() {
        let store = Arc::new(MemorySubmissionStore::new());
        let model = Arc::new(ScriptedModel::replying(JANE_REPLY));
        let pipeline = ValidationPipeline::new(store.clone(), model.clone(), TIMEOUT);
        let file = uploaded_file();

        let outcome = pipeline.run(jane_request(file.path())).await.unwrap();

        assert!(outcome.success);
        assert!(outcome.validation_result.is_valid);
        assert!(outcome.validation_result.error.is_none());
        assert_eq!(outcome.validation_result.overall_summary, "All fields match.");
        for field in FieldName::ALL {
            assert_eq!(outcome.validation_result.matches.get(field), Some(true));
        }

        let stored = store.get(outcome.submission.id).await.unwrap().unwrap();
        assert_eq!(stored.validated, Some(true));
        assert_eq!(stored.result(), Some(&outcome.validation_result));
        assert_eq!(stored.pdf_url, "/uploads/jane.pdf");
        let content = stored.pdf_content.as_deref().unwrap();
        assert!(content.contains("Jane Doe"), "pdfContent={content:?}");
        assert_eq!(model.calls(), 1);
    }

    #[tokio::test]
    async fn test_prompt_carries_declared_fields() {
        let store = Arc::new(MemorySubmissionStore::new());
        let model = Arc::new(ScriptedModel::replying(JANE_REPLY));
        let pipeline = ValidationPipeline::new(store, model.clone(), TIMEOUT);
        let file = uploaded_file();

        pipeline.run(jane_request(file.path())).await.unwrap();

        let prompts = model.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        for value in ["Jane Doe", "jane@x.com", "+15551234567", "Go, SQL", "5 years backend."] {
            assert!(prompts[0].contains(value), "prompt is missing {value}");
        }
    }

    #[tokio::test]
    async fn test_rate_limited_provider_still_stores_submission() {
        let store = Arc::new(MemorySubmissionStore::new());
        let model = Arc::new(ScriptedModel::failing(ModelError::RateLimited {
            message: "HTTP 429".to_string(),
        }));
        let pipeline = ValidationPipeline::new(store.clone(), model, TIMEOUT);
        let file = uploaded_file();

        let outcome = pipeline.run(jane_request(file.path())).await.unwrap();

        let result = &outcome.validation_result;
        assert!(result.is_valid);
        assert_eq!(result.error, Some(ValidationErrorCode::RateLimited));
        assert!(result.matches.all_unevaluated());
        assert!(result.overall_summary.contains("quota"));

        let stored = store.get(outcome.submission.id).await.unwrap().unwrap();
        assert_eq!(stored.validated, Some(true));
        assert_eq!(stored.result(), Some(result));
    }

    #[tokio::test]
    async fn test_unparsable_reply_degrades_to_parse_error() {
        let store = Arc::new(MemorySubmissionStore::new());
        let model = Arc::new(ScriptedModel::replying("Sorry, I cannot help with that."));
        let pipeline = ValidationPipeline::new(store.clone(), model, TIMEOUT);
        let file = uploaded_file();

        let outcome = pipeline.run(jane_request(file.path())).await.unwrap();

        assert_eq!(
            outcome.validation_result.error,
            Some(ValidationErrorCode::ParseError)
        );
        assert_eq!(outcome.submission.validated, Some(true));
    }

    #[tokio::test(start_paused = true)]
    async fn test_model_timeout_is_transport_error() {
        let store = Arc::new(MemorySubmissionStore::new());
        let pipeline = ValidationPipeline::new(store.clone(), Arc::new(SlowModel), TIMEOUT);
        let file = uploaded_file();

        let outcome = pipeline.run(jane_request(file.path())).await.unwrap();

        assert_eq!(
            outcome.validation_result.error,
            Some(ValidationErrorCode::TransportError)
        );
        assert_eq!(store.count().await, 1);
    }

    #[tokio::test]
    async fn test_missing_file_aborts_before_any_write() {
        let store = Arc::new(MemorySubmissionStore::new());
        let model = Arc::new(ScriptedModel::replying(JANE_REPLY));
        let pipeline = ValidationPipeline::new(store.clone(), model.clone(), TIMEOUT);
        let dir = tempfile::tempdir().unwrap();

        let err = pipeline
            .run(jane_request(&dir.path().join("gone.pdf")))
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::ExtractionFailed(_)));
        assert_eq!(store.count().await, 0);
        assert!(store.list_recent(None).await.unwrap().is_empty());
        assert_eq!(model.calls(), 0);
    }

    #[tokio::test]
    async fn test_store_failure_is_fatal_and_skips_model() {
        let model = Arc::new(ScriptedModel::replying(JANE_REPLY));
        let pipeline = ValidationPipeline::new(Arc::new(UnavailableStore), model.clone(), TIMEOUT);
        let file = uploaded_file();

        let err = pipeline.run(jane_request(file.path())).await.unwrap_err();

        assert!(matches!(err, PipelineError::StoreFailure(_)));
        assert_eq!(model.calls(), 0);
    }

    #[test]
    fn test_request_deserializes_from_camel_case() {
        let request: SubmissionRequest = serde_json::from_value(serde_json::json!({
            "fullName": "Jane Doe",
            "email": "jane@x.com",
            "phone": "+15551234567",
            "skills": ["Go", "SQL"],
            "experience": "5 years backend.",
            "pdfPath": "uploads/cv.pdf"
        }))
        .unwrap();
        assert_eq!(request.fields.full_name, "Jane Doe");
        assert_eq!(request.pdf_path, "uploads/cv.pdf");
        assert!(request.pdf_url.is_none());
    }
}
