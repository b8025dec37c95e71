//! Prompt builder for the CV consistency check.

use crate::validation::models::{DeclaredFields, FieldName};

/// Reply schema the model is told to follow. Appended verbatim to every prompt.
pub const VALIDATION_REPLY_INSTRUCTION: &str = r#"Compare each declared field above with the CV text and reply with a JSON object in EXACTLY this shape:
{
  "isValid": boolean,
  "matches": {
    "fullName": boolean,
    "email": boolean,
    "phone": boolean,
    "skills": boolean,
    "experience": boolean
  },
  "details": {
    "fullName": "string",
    "email": "string",
    "phone": "string",
    "skills": "string",
    "experience": "string"
  },
  "overallSummary": "string"
}

RULES:
1. "matches" says whether the CV text supports each declared field.
2. "details" explains each verdict in one or two sentences.
3. "isValid" is true only when the declared information is consistent with the CV overall.
4. Return ONLY the JSON object. No prose before or after it, no code fences."#;

/// Builds the comparison prompt from the declared fields and the extracted CV text.
///
/// Field values and the CV text are embedded unmodified; skills are joined with ", ".
pub fn build_validation_prompt(fields: &DeclaredFields, pdf_text: &str) -> String {
    let mut prompt = String::from(
        "You are checking whether the information a candidate entered in a form \
         is consistent with the text of the CV they uploaded.\n\nDECLARED FIELDS:\n",
    );

    for field in FieldName::ALL {
        prompt.push_str("- ");
        prompt.push_str(field.label());
        prompt.push_str(": ");
        prompt.push_str(&field_value(fields, field));
        prompt.push('\n');
    }

    prompt.push_str("\nCV TEXT:\n");
    prompt.push_str(pdf_text);
    prompt.push_str("\n\n");
    prompt.push_str(VALIDATION_REPLY_INSTRUCTION);
    prompt
}

fn field_value(fields: &DeclaredFields, field: FieldName) -> String {
    match field {
        FieldName::FullName => fields.full_name.clone(),
        FieldName::Email => fields.email.clone(),
        FieldName::Phone => fields.phone.clone(),
        FieldName::Skills => fields.skills.join(", "),
        FieldName::Experience => fields.experience.clone(),
    }
}
