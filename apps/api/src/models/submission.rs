#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::validation::models::{DeclaredFields, ValidationResult};

/// One stored attempt to validate a CV.
///
/// `validated` and `validation_result` stay `None` until the outcome is attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub skills: Vec<String>,
    pub experience: String,
    pub pdf_url: String,
    pub pdf_content: Option<String>,
    pub validated: Option<bool>,
    pub validation_result: Option<Json<ValidationResult>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Submission {
    pub fn declared_fields(&self) -> DeclaredFields {
        DeclaredFields {
            full_name: self.full_name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            skills: self.skills.clone(),
            experience: self.experience.clone(),
        }
    }

    pub fn result(&self) -> Option<&ValidationResult> {
        self.validation_result.as_ref().map(|r| &r.0)
    }
}

/// Declared fields plus evidence, as written by the first store write.
#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub fields: DeclaredFields,
    pub pdf_url: String,
    pub pdf_content: Option<String>,
}
