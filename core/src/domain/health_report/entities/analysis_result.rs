use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Health report produced for every request, including failed ones.
///
/// A `confidence_score` of `0` together with empty `ingredients` marks a
/// degraded report rather than a genuine analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detected_region: Option<String>,
    pub ingredients: Vec<IngredientFinding>,
    pub packaging_notes: String,
    pub additives_notes: String,
    pub overall_profile: String,
    pub regulatory_status: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub regional_variants: Vec<RegionalVariant>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    pub confidence_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternatives: Vec<String>,
    pub sources: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IngredientFinding {
    pub name: String,
    pub purpose: String,
    pub health_effects: String,
    pub safety_level: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regional_note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_flag: Option<RiskFlag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specific_concerns: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum RiskFlag {
    RegionalConcern,
    Consistent,
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegionalVariant {
    pub region: String,
    pub summary: String,
    pub differences: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_class: Option<VariantClass>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum VariantClass {
    Cleaner,
    Different,
    Riskier,
    Unknown,
}

impl AnalysisResult {
    /// Both essential fields carry content.
    pub fn is_complete(&self) -> bool {
        !self.summary.trim().is_empty() && !self.ingredients.is_empty()
    }

    pub fn missing_essentials(&self) -> Vec<String> {
        let mut missing = Vec::new();
        if self.summary.trim().is_empty() {
            missing.push("summary".to_string());
        }
        if self.ingredients.is_empty() {
            missing.push("ingredients".to_string());
        }
        missing
    }

    pub fn is_degraded(&self) -> bool {
        self.confidence_score == 0.0 && self.ingredients.is_empty()
    }
}
