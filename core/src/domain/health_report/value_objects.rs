use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::provider::entities::ProviderId;

/// Image payload sent alongside the prompt text. `data` is the base64
/// payload exactly as received; it is never decoded here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaPart {
    pub mime_type: String,
    pub data: String,
}

impl MediaPart {
    /// Splits a `data:<mime>;base64,<payload>` string.
    pub fn from_data_uri(value: &str) -> Option<Self> {
        let rest = value.strip_prefix("data:")?;
        let (header, data) = rest.split_once(',')?;
        let mime_type = header.strip_suffix(";base64")?;
        if mime_type.is_empty() || data.is_empty() {
            return None;
        }

        Some(Self {
            mime_type: mime_type.to_string(),
            data: data.to_string(),
        })
    }

    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptData {
    pub text: String,
    pub media: Option<MediaPart>,
}

/// Uniform call made to any backend adapter.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub provider: ProviderId,
    pub model: String,
    pub prompt: PromptData,
    pub response_schema: serde_json::Value,
    /// Short identifier for the expected output, used where a provider
    /// needs a schema or tool name.
    pub schema_name: &'static str,
}

/// Candidate product names returned by `search`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub results: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Every offending field found in one candidate.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn push(&mut self, error: FieldError) {
        self.errors.push(error);
    }

    /// Offending top-level or nested field paths, deduplicated in order.
    pub fn fields(&self) -> Vec<String> {
        let mut fields: Vec<String> = Vec::new();
        for error in &self.errors {
            if !fields.contains(&error.field) {
                fields.push(error.field.clone());
            }
        }
        fields
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} field(s) failed validation", self.errors.len())?;
        for (i, error) in self.errors.iter().enumerate() {
            let separator = if i == 0 { ": " } else { "; " };
            write!(f, "{separator}{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_part_from_data_uri() {
        let media = MediaPart::from_data_uri("data:image/jpeg;base64,/9j/4AAQ").unwrap();
        assert_eq!(media.mime_type, "image/jpeg");
        assert_eq!(media.data, "/9j/4AAQ");
        assert_eq!(media.to_data_uri(), "data:image/jpeg;base64,/9j/4AAQ");
    }

    #[test]
    fn test_media_part_rejects_plain_text() {
        assert!(MediaPart::from_data_uri("Maggi Noodles").is_none());
        assert!(MediaPart::from_data_uri("data:image/png,raw").is_none());
    }

    #[test]
    fn test_validation_errors_display() {
        let mut errors = ValidationErrors::default();
        errors.push(FieldError::new("summary", "is required"));
        errors.push(FieldError::new("confidenceScore", "must be between 0 and 100"));
        assert_eq!(
            errors.to_string(),
            "2 field(s) failed validation: summary: is required; confidenceScore: must be between 0 and 100"
        );
        assert_eq!(errors.fields(), vec!["summary", "confidenceScore"]);
    }
}
