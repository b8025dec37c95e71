//! Response normalizer: turns whatever the model adapter produced into a
//! well-formed [`ValidationResult`].
//!
//! Nothing here returns an error. Validation is advisory, so every failure path
//! degrades to a fallback result that still accepts the submission and records
//! why the comparison did not complete.

use serde::Deserialize;
use tracing::warn;

use crate::llm_client::ModelError;
use crate::validation::models::{
    FieldDetails, FieldMatches, ValidationErrorCode, ValidationResult,
};

const UNAVAILABLE_DETAIL: &str = "Validation unavailable for this field.";

/// Shape the model is asked to reply with. Every key is required.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelReply {
    is_valid: bool,
    matches: ReplyMatches,
    details: FieldDetails,
    overall_summary: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReplyMatches {
    full_name: bool,
    email: bool,
    phone: bool,
    skills: bool,
    experience: bool,
}

impl From<ModelReply> for ValidationResult {
    fn from(reply: ModelReply) -> Self {
        ValidationResult {
            is_valid: reply.is_valid,
            matches: FieldMatches {
                full_name: Some(reply.matches.full_name),
                email: Some(reply.matches.email),
                phone: Some(reply.matches.phone),
                skills: Some(reply.matches.skills),
                experience: Some(reply.matches.experience),
            },
            details: reply.details,
            overall_summary: reply.overall_summary,
            error: None,
        }
    }
}

/// Normalizes the outcome of one model round trip.
pub fn normalize(outcome: Result<String, ModelError>) -> ValidationResult {
    match outcome {
        Ok(raw) => normalize_reply(&raw),
        Err(e) => {
            warn!("Model call failed, using fallback validation result: {e}");
            fallback_for_model_error(&e)
        }
    }
}

/// Parses a raw model reply, falling back to a `parse_error` result when it does
/// not match the expected schema.
pub fn normalize_reply(raw: &str) -> ValidationResult {
    let cleaned = strip_code_fence(raw);
    match serde_json::from_str::<ModelReply>(cleaned) {
        Ok(reply) => reply.into(),
        Err(e) => {
            warn!("Could not parse model reply as a validation result: {e}");
            fallback(
                ValidationErrorCode::ParseError,
                "The AI validation response could not be parsed, so the CV was not \
                 checked automatically. The submission has been accepted.",
            )
        }
    }
}

/// Maps each adapter failure kind to its own error code and summary.
pub fn fallback_for_model_error(error: &ModelError) -> ValidationResult {
    match error {
        ModelError::RateLimited { .. } => fallback(
            ValidationErrorCode::RateLimited,
            "AI validation quota exceeded, so the CV was not checked automatically. \
             The submission has been accepted.",
        ),
        ModelError::ModelUnavailable { model, .. } => fallback(
            ValidationErrorCode::ModelUnavailable,
            &format!(
                "The AI model '{model}' is not available, so the CV was not checked \
                 automatically. The submission has been accepted."
            ),
        ),
        ModelError::Provider { status, .. } => fallback(
            ValidationErrorCode::ProviderError,
            &format!(
                "The AI validation service returned an error (status {status}), so the \
                 CV was not checked automatically. The submission has been accepted."
            ),
        ),
        ModelError::Transport(_) => fallback(
            ValidationErrorCode::TransportError,
            "The AI validation service could not be reached, so the CV was not checked \
             automatically. The submission has been accepted.",
        ),
    }
}

fn fallback(code: ValidationErrorCode, summary: &str) -> ValidationResult {
    ValidationResult {
        is_valid: true,
        matches: FieldMatches::default(),
        details: FieldDetails::uniform(UNAVAILABLE_DETAIL),
        overall_summary: summary.to_string(),
        error: Some(code),
    }
}

/// Removes a single outer ```` ``` ```` fence, with or without a language tag.
///
/// Only a reply that starts with a fence is touched; JSON embedded in surrounding
/// prose is left for the parser to reject.
fn strip_code_fence(text: &str) -> &str {
    let text = text.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // An opening line without JSON is the info string; drop all of it.
    let body = match rest.split_once('\n') {
        Some((opening, after)) if !opening.contains(['{', '[']) => after,
        _ => rest
            .trim_start()
            .trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
    };
    let body = body.trim_end();
    body.strip_suffix("```").unwrap_or(body).trim()
}
