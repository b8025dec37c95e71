use async_trait::async_trait;
use chrono::Utc;
use sqlx::types::Json;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{StoreError, SubmissionStore};
use crate::models::submission::{NewSubmission, Submission};
use crate::validation::models::ValidationResult;

/// Process-local store used when no database is configured, and by tests.
///
/// Submissions are kept in insertion order, which is also creation order.
#[derive(Default)]
pub struct MemorySubmissionStore {
    rows: RwLock<Vec<Submission>>,
}

impl MemorySubmissionStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn count(&self) -> usize {
        self.rows.read().await.len()
    }
}

#[async_trait]
impl SubmissionStore for MemorySubmissionStore {
    async fn create(&self, submission: NewSubmission) -> Result<Submission, StoreError> {
        let now = Utc::now();
        let fields = submission.fields;
        let row = Submission {
            id: Uuid::new_v4(),
            full_name: fields.full_name,
            email: fields.email,
            phone: fields.phone,
            skills: fields.skills,
            experience: fields.experience,
            pdf_url: submission.pdf_url,
            pdf_content: submission.pdf_content,
            validated: None,
            validation_result: None,
            created_at: now,
            updated_at: now,
        };
        self.rows.write().await.push(row.clone());
        Ok(row)
    }

    async fn attach_result(
        &self,
        id: Uuid,
        result: &ValidationResult,
    ) -> Result<Submission, StoreError> {
        let mut rows = self.rows.write().await;
        let row = rows
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(StoreError::NotFound(id))?;
        row.validated = Some(result.is_valid);
        row.validation_result = Some(Json(result.clone()));
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Submission>, StoreError> {
        Ok(self.rows.read().await.iter().find(|r| r.id == id).cloned())
    }

    async fn list_recent(&self, limit: Option<u32>) -> Result<Vec<Submission>, StoreError> {
        let rows = self.rows.read().await;
        let limit = limit.map_or(rows.len(), |l| l as usize);
        Ok(rows.iter().rev().take(limit).cloned().collect())
    }
}
