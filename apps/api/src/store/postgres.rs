use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use super::{StoreError, SubmissionStore};
use crate::models::submission::{NewSubmission, Submission};
use crate::validation::models::ValidationResult;

const COLUMNS: &str = "id, full_name, email, phone, skills, experience, pdf_url, pdf_content, \
     validated, validation_result, created_at, updated_at";

/// PostgreSQL-backed store over the `cv_submissions` table.
#[derive(Clone)]
pub struct PgSubmissionStore {
    pool: PgPool,
}

impl PgSubmissionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubmissionStore for PgSubmissionStore {
    async fn create(&self, submission: NewSubmission) -> Result<Submission, StoreError> {
        let NewSubmission {
            fields,
            pdf_url,
            pdf_content,
        } = submission;
        let id = Uuid::new_v4();

        let row = sqlx::query_as::<_, Submission>(&format!(
            r#"
            INSERT INTO cv_submissions
                (id, full_name, email, phone, skills, experience, pdf_url, pdf_content)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&fields.full_name)
        .bind(&fields.email)
        .bind(&fields.phone)
        .bind(&fields.skills)
        .bind(&fields.experience)
        .bind(&pdf_url)
        .bind(&pdf_content)
        .fetch_one(&self.pool)
        .await?;

        info!("Inserted submission {id}");
        Ok(row)
    }

    async fn attach_result(
        &self,
        id: Uuid,
        result: &ValidationResult,
    ) -> Result<Submission, StoreError> {
        let row = sqlx::query_as::<_, Submission>(&format!(
            r#"
            UPDATE cv_submissions
            SET validated = $2, validation_result = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(result.is_valid)
        .bind(Json(result.clone()))
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or(StoreError::NotFound(id))
    }

    async fn get(&self, id: Uuid) -> Result<Option<Submission>, StoreError> {
        Ok(sqlx::query_as::<_, Submission>(&format!(
            "SELECT {COLUMNS} FROM cv_submissions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn list_recent(&self, limit: Option<u32>) -> Result<Vec<Submission>, StoreError> {
        // LIMIT NULL means no limit in PostgreSQL.
        Ok(sqlx::query_as::<_, Submission>(&format!(
            "SELECT {COLUMNS} FROM cv_submissions ORDER BY created_at DESC, id LIMIT $1"
        ))
        .bind(limit.map(i64::from))
        .fetch_all(&self.pool)
        .await?)
    }
}
