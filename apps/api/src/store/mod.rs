//! Submission store: the two pipeline writes plus read-back.
//!
//! Declared fields and evidence are written once by [`SubmissionStore::create`] and
//! never changed; [`SubmissionStore::attach_result`] only fills in the outcome.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::submission::{NewSubmission, Submission};
use crate::validation::models::ValidationResult;

pub mod memory;
pub mod postgres;

pub use memory::MemorySubmissionStore;
pub use postgres::PgSubmissionStore;

/// Upper bound on `list_recent` page size.
pub const MAX_LIST_LIMIT: u32 = 200;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Submission {0} not found")]
    NotFound(Uuid),
}

#[async_trait]
pub trait SubmissionStore: Send + Sync {
    /// Inserts a new submission with its outcome unset.
    async fn create(&self, submission: NewSubmission) -> Result<Submission, StoreError>;

    /// Attaches the validation outcome and bumps `updated_at`.
    async fn attach_result(
        &self,
        id: Uuid,
        result: &ValidationResult,
    ) -> Result<Submission, StoreError>;

    async fn get(&self, id: Uuid) -> Result<Option<Submission>, StoreError>;

    /// Newest first. `None` returns every submission.
    async fn list_recent(&self, limit: Option<u32>) -> Result<Vec<Submission>, StoreError>;
}
