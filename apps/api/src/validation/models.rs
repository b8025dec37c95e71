#![allow(dead_code)]

use serde::{Deserialize, Serialize};

/// The five attributes a user declares about themselves. Taken at face value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclaredFields {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub skills: Vec<String>,
    pub experience: String,
}

/// Names of the declared fields, in the order they are presented to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldName {
    FullName,
    Email,
    Phone,
    Skills,
    Experience,
}

impl FieldName {
    pub const ALL: [FieldName; 5] = [
        FieldName::FullName,
        FieldName::Email,
        FieldName::Phone,
        FieldName::Skills,
        FieldName::Experience,
    ];

    /// Key used in the JSON reply schema.
    pub fn key(self) -> &'static str {
        match self {
            FieldName::FullName => "fullName",
            FieldName::Email => "email",
            FieldName::Phone => "phone",
            FieldName::Skills => "skills",
            FieldName::Experience => "experience",
        }
    }

    /// Human label used in prompts.
    pub fn label(self) -> &'static str {
        match self {
            FieldName::FullName => "Full Name",
            FieldName::Email => "Email",
            FieldName::Phone => "Phone",
            FieldName::Skills => "Skills",
            FieldName::Experience => "Experience",
        }
    }
}

/// Per-field match verdicts. `None` means the field was not evaluated.
///
/// Serializes every key, including unevaluated ones as `null`, so the key set
/// always matches the declared fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMatches {
    pub full_name: Option<bool>,
    pub email: Option<bool>,
    pub phone: Option<bool>,
    pub skills: Option<bool>,
    pub experience: Option<bool>,
}

impl FieldMatches {
    pub fn get(&self, field: FieldName) -> Option<bool> {
        match field {
            FieldName::FullName => self.full_name,
            FieldName::Email => self.email,
            FieldName::Phone => self.phone,
            FieldName::Skills => self.skills,
            FieldName::Experience => self.experience,
        }
    }

    pub fn all_unevaluated(&self) -> bool {
        FieldName::ALL.iter().all(|f| self.get(*f).is_none())
    }
}

/// Per-field free-text explanations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDetails {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub skills: String,
    pub experience: String,
}

impl FieldDetails {
    /// Same explanation for every field.
    pub fn uniform(text: &str) -> Self {
        Self {
            full_name: text.to_string(),
            email: text.to_string(),
            phone: text.to_string(),
            skills: text.to_string(),
            experience: text.to_string(),
        }
    }

    pub fn get(&self, field: FieldName) -> &str {
        match field {
            FieldName::FullName => &self.full_name,
            FieldName::Email => &self.email,
            FieldName::Phone => &self.phone,
            FieldName::Skills => &self.skills,
            FieldName::Experience => &self.experience,
        }
    }
}

/// Stable reason codes for a degraded validation result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationErrorCode {
    RateLimited,
    ModelUnavailable,
    ProviderError,
    TransportError,
    ParseError,
}

impl ValidationErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ValidationErrorCode::RateLimited => "rate_limited",
            ValidationErrorCode::ModelUnavailable => "model_unavailable",
            ValidationErrorCode::ProviderError => "provider_error",
            ValidationErrorCode::TransportError => "transport_error",
            ValidationErrorCode::ParseError => "parse_error",
        }
    }
}

/// Normalized outcome of one comparison attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub matches: FieldMatches,
    pub details: FieldDetails,
    pub overall_summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ValidationErrorCode>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unevaluated_matches_serialize_every_key_as_null() {
        let value = serde_json::to_value(FieldMatches::default()).unwrap();
        assert_eq!(
            value,
            json!({
                "fullName": null,
                "email": null,
                "phone": null,
                "skills": null,
                "experience": null
            })
        );
    }

    #[test]
    fn test_field_keys_match_serialized_names() {
        let value = serde_json::to_value(FieldDetails::uniform("x")).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), FieldName::ALL.len());
        for field in FieldName::ALL {
            assert!(object.contains_key(field.key()), "missing {}", field.key());
        }
    }

    #[test]
    fn test_error_code_serializes_as_snake_case() {
        for code in [
            ValidationErrorCode::RateLimited,
            ValidationErrorCode::ModelUnavailable,
            ValidationErrorCode::ProviderError,
            ValidationErrorCode::TransportError,
            ValidationErrorCode::ParseError,
        ] {
            let value = serde_json::to_value(code).unwrap();
            assert_eq!(value, json!(code.as_str()));
        }
    }

    #[test]
    fn test_result_without_error_omits_key() {
        let result = ValidationResult {
            is_valid: true,
            matches: FieldMatches::default(),
            details: FieldDetails::default(),
            overall_summary: "ok".to_string(),
            error: None,
        };
        let value = serde_json::to_value(&result).unwrap();
        assert!(value.get("error").is_none());
        assert_eq!(value["isValid"], json!(true));
    }

    #[test]
    fn test_declared_fields_use_camel_case() {
        let fields: DeclaredFields = serde_json::from_value(json!({
            "fullName": "Jane Doe",
            "email": "jane@x.com",
            "phone": "+15551234567",
            "skills": ["Go", "SQL"],
            "experience": "5 years backend."
        }))
        .unwrap();
        assert_eq!(fields.full_name, "Jane Doe");
        assert_eq!(fields.skills, vec!["Go", "SQL"]);
    }
}
