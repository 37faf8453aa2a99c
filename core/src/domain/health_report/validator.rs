use serde_json::{Map, Value};

use crate::domain::{
    health_report::{
        entities::AnalysisResult,
        schema::{self, ANALYSIS_RESULT_FIELDS},
        value_objects::ValidationErrors,
    },
    provider::entities::ProviderId,
};

/// Substituted when a schema-valid report claims zero confidence.
pub const DEFAULT_CONFIDENCE: f64 = 60.0;
pub const NOT_AVAILABLE: &str = "Not available";
pub const FAILED_MARKER: &str = "Analysis failed:";
pub const INCOMPLETE_MARKER: &str = "Analysis incomplete:";

/// Fields never taken over from a rejected attempt.
const NON_MERGEABLE_FIELDS: &[&str] = &["ingredients", "confidenceScore"];

/// Validates backend output and applies the normalization rules.
pub fn validate(raw: &Value, provider: ProviderId) -> Result<AnalysisResult, ValidationErrors> {
    schema::validate(raw).map(|result| normalize(result, provider))
}

pub fn normalize(mut result: AnalysisResult, provider: ProviderId) -> AnalysisResult {
    if result.confidence_score <= 0.0 {
        tracing::debug!(
            provider = %provider,
            "Model reported zero confidence, substituting default"
        );
        result.confidence_score = DEFAULT_CONFIDENCE;
    }
    if result.sources.is_empty() {
        result.sources = vec![provider.display_name().to_string()];
    }
    result
}

/// Fallback report used for every degraded outcome.
pub fn default_result(provider: ProviderId, summary: impl Into<String>) -> AnalysisResult {
    AnalysisResult {
        summary: summary.into(),
        detected_region: None,
        ingredients: Vec::new(),
        packaging_notes: NOT_AVAILABLE.to_string(),
        additives_notes: NOT_AVAILABLE.to_string(),
        overall_profile: NOT_AVAILABLE.to_string(),
        regulatory_status: NOT_AVAILABLE.to_string(),
        regional_variants: Vec::new(),
        warning: None,
        confidence_score: 0.0,
        risk_score: None,
        risk_level: None,
        alternatives: Vec::new(),
        sources: vec![provider.display_name().to_string()],
    }
}

/// Overlays every top-level field of `raw` that validates on its own onto
/// `base`. Ingredient findings and the confidence score always stay at their
/// degraded values, and a salvaged summary keeps the incomplete marker.
pub fn merge_partial(base: AnalysisResult, raw: Option<&Value>) -> AnalysisResult {
    let Some(Value::Object(raw)) = raw else {
        return base;
    };
    let Ok(Value::Object(mut merged)) = serde_json::to_value(&base) else {
        return base;
    };

    for field in ANALYSIS_RESULT_FIELDS {
        if NON_MERGEABLE_FIELDS.contains(&field.name) {
            continue;
        }
        let Some(value) = raw.get(field.name).filter(|v| !v.is_null()) else {
            continue;
        };
        let Ok(repaired) = schema::check_field(field, value) else {
            continue;
        };
        if is_blank(&repaired) {
            continue;
        }
        let repaired = match (field.name, repaired) {
            ("summary", Value::String(text)) => Value::String(mark_incomplete(&text)),
            (_, repaired) => repaired,
        };
        merged.insert(field.name.to_string(), repaired);
    }

    from_merged(merged).unwrap_or(base)
}

fn mark_incomplete(summary: &str) -> String {
    let summary = summary.trim();
    if summary.starts_with(INCOMPLETE_MARKER) {
        summary.to_string()
    } else {
        format!("{INCOMPLETE_MARKER} {summary}")
    }
}

fn from_merged(merged: Map<String, Value>) -> Option<AnalysisResult> {
    serde_json::from_value(Value::Object(merged)).ok()
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn minimal_report(confidence: f64) -> Value {
        json!({
            "summary": "Plain rolled oats.",
            "ingredients": [{
                "name": "Oats",
                "purpose": "Whole grain",
                "healthEffects": "High in beta-glucan fibre.",
                "safetyLevel": "Safe"
            }],
            "packagingNotes": "Paper bag.",
            "additivesNotes": "None.",
            "overallProfile": "Minimally processed.",
            "regulatoryStatus": "Unrestricted.",
            "confidenceScore": confidence,
            "sources": []
        })
    }

    #[test]
    fn test_zero_confidence_is_coerced() {
        let result = validate(&minimal_report(0.0), ProviderId::HostedA).unwrap();
        assert_eq!(result.confidence_score, DEFAULT_CONFIDENCE);
    }

    #[test]
    fn test_low_confidence_is_kept() {
        let result = validate(&minimal_report(12.0), ProviderId::HostedA).unwrap();
        assert_eq!(result.confidence_score, 12.0);
    }

    #[test]
    fn test_empty_sources_name_the_provider() {
        let result = validate(&minimal_report(70.0), ProviderId::HostedB).unwrap();
        assert_eq!(result.sources, vec!["OpenAI"]);
    }

    #[test]
    fn test_default_result_is_degraded() {
        let result = default_result(ProviderId::Local, "Analysis failed: boom");
        assert!(result.is_degraded());
        assert!(!result.is_complete());
        assert_eq!(result.packaging_notes, NOT_AVAILABLE);
        assert_eq!(result.sources, vec!["Ollama (local model)"]);
    }

    #[test]
    fn test_merge_partial_keeps_valid_fields_only() {
        let raw = json!({
            "summary": "Sugary breakfast cereal.",
            "ingredients": [{ "name": "Sugar" }],
            "packagingNotes": "Plastic liner.",
            "additivesNotes": 42,
            "overallProfile": { "unexpected": true },
            "confidenceScore": 80,
            "riskScore": 9,
            "alternatives": ["Muesli"],
            "sources": []
        });
        let merged = merge_partial(
            default_result(ProviderId::HostedA, "Analysis incomplete: x"),
            Some(&raw),
        );
        assert_eq!(merged.summary, "Analysis incomplete: Sugary breakfast cereal.");
        assert_eq!(merged.packaging_notes, "Plastic liner.");
        assert_eq!(merged.additives_notes, "42");
        assert_eq!(merged.overall_profile, NOT_AVAILABLE);
        assert_eq!(merged.risk_score, None);
        assert_eq!(merged.alternatives, vec!["Muesli"]);
        assert_eq!(merged.sources, vec!["Google Gemini"]);
        assert!(merged.ingredients.is_empty());
        assert_eq!(merged.confidence_score, 0.0);
    }

    #[test]
    fn test_merged_summary_is_marked_once() {
        let base = default_result(ProviderId::Local, "Analysis incomplete: empty");
        let merged = merge_partial(base.clone(), Some(&json!({ "summary": "  Looks fine. " })));
        assert_eq!(merged.summary, "Analysis incomplete: Looks fine.");

        let merged = merge_partial(base, Some(&json!({ "summary": "Analysis incomplete: partial" })));
        assert_eq!(merged.summary, "Analysis incomplete: partial");
    }

    #[test]
    fn test_merge_partial_without_output_returns_base() {
        let base = default_result(ProviderId::HostedC, "Analysis incomplete: empty");
        assert_eq!(merge_partial(base.clone(), None), base);
        assert_eq!(merge_partial(base.clone(), Some(&json!("text"))), base);
    }
}
