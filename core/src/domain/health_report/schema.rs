use serde_json::{Map, Value, json};

use crate::domain::health_report::{
    entities::AnalysisResult,
    value_objects::{FieldError, SearchResult, ValidationErrors},
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    String,
    Number { min: f64, max: f64 },
    Enum(&'static [&'static str]),
    StringList { max_items: Option<usize> },
    ObjectList(&'static [FieldSpec]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Required,
    Optional,
    /// Shown to the model as required, filled with an empty value when absent.
    Defaulted,
}

/// One entry of the output contract. The description is shown verbatim to
/// the model, both in native response schemas and in the local field guide.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub presence: Presence,
    pub description: &'static str,
}

pub const RISK_FLAG_VALUES: &[&str] = &["regional-concern", "consistent", "none"];
pub const VARIANT_CLASS_VALUES: &[&str] = &["cleaner", "different", "riskier", "unknown"];
pub const MAX_ALTERNATIVES: usize = 4;
pub const MAX_SEARCH_RESULTS: usize = 10;

pub const INGREDIENT_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "name",
        kind: FieldKind::String,
        presence: Presence::Required,
        description: "Ingredient name as printed on the label.",
    },
    FieldSpec {
        name: "purpose",
        kind: FieldKind::String,
        presence: Presence::Required,
        description: "What the ingredient does in the product, e.g. emulsifier, sweetener, preservative.",
    },
    FieldSpec {
        name: "healthEffects",
        kind: FieldKind::String,
        presence: Presence::Required,
        description: "Known health effects, positive or negative, in one or two sentences.",
    },
    FieldSpec {
        name: "safetyLevel",
        kind: FieldKind::String,
        presence: Presence::Required,
        description: "Overall safety rating such as Safe, Moderate, Caution or Avoid.",
    },
    FieldSpec {
        name: "regionalNote",
        kind: FieldKind::String,
        presence: Presence::Optional,
        description: "How regulation or use of this ingredient differs between regions, if relevant.",
    },
    FieldSpec {
        name: "riskFlag",
        kind: FieldKind::Enum(RISK_FLAG_VALUES),
        presence: Presence::Optional,
        description: "regional-concern when restricted or banned in a comparator region, consistent when treated the same everywhere, none otherwise.",
    },
    FieldSpec {
        name: "specificConcerns",
        kind: FieldKind::StringList { max_items: None },
        presence: Presence::Optional,
        description: "Short tags for notable concerns, e.g. \"high sodium\", \"allergen\", \"artificial colour\".",
    },
];

pub const REGIONAL_VARIANT_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "region",
        kind: FieldKind::String,
        presence: Presence::Required,
        description: "Comparator region, e.g. EU, US, UK.",
    },
    FieldSpec {
        name: "summary",
        kind: FieldKind::String,
        presence: Presence::Required,
        description: "How the formulation sold in that region compares.",
    },
    FieldSpec {
        name: "differences",
        kind: FieldKind::StringList { max_items: None },
        presence: Presence::Required,
        description: "Ordered formulation differences, each starting with \"Added:\", \"Removed:\" or \"Same:\".",
    },
    FieldSpec {
        name: "variantClass",
        kind: FieldKind::Enum(VARIANT_CLASS_VALUES),
        presence: Presence::Optional,
        description: "Whether that region's formulation is cleaner, different, riskier or unknown relative to the analyzed one.",
    },
];

pub const ANALYSIS_RESULT_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "summary",
        kind: FieldKind::String,
        presence: Presence::Required,
        description: "Two to four sentence overview of the product's health profile.",
    },
    FieldSpec {
        name: "detectedRegion",
        kind: FieldKind::String,
        presence: Presence::Optional,
        description: "Region whose formulation was analyzed, when it can be determined.",
    },
    FieldSpec {
        name: "ingredients",
        kind: FieldKind::ObjectList(INGREDIENT_FIELDS),
        presence: Presence::Required,
        description: "One entry per significant ingredient, in label order.",
    },
    FieldSpec {
        name: "packagingNotes",
        kind: FieldKind::String,
        presence: Presence::Required,
        description: "Packaging concerns such as BPA, microplastics, or recyclability.",
    },
    FieldSpec {
        name: "additivesNotes",
        kind: FieldKind::String,
        presence: Presence::Required,
        description: "Commentary on additives, colours, flavour enhancers and preservatives (with E-numbers where known).",
    },
    FieldSpec {
        name: "overallProfile",
        kind: FieldKind::String,
        presence: Presence::Required,
        description: "Nutritional profile: sugar, salt, fat, fibre and degree of processing.",
    },
    FieldSpec {
        name: "regulatoryStatus",
        kind: FieldKind::String,
        presence: Presence::Required,
        description: "Regulatory standing with FSSAI, EFSA, FDA or other relevant authorities.",
    },
    FieldSpec {
        name: "regionalVariants",
        kind: FieldKind::ObjectList(REGIONAL_VARIANT_FIELDS),
        presence: Presence::Optional,
        description: "Comparison with the formulations of the same product sold in other regions.",
    },
    FieldSpec {
        name: "warning",
        kind: FieldKind::String,
        presence: Presence::Optional,
        description: "Set only when the analyzed region's formulation is materially worse than another region's.",
    },
    FieldSpec {
        name: "confidenceScore",
        kind: FieldKind::Number { min: 0.0, max: 100.0 },
        presence: Presence::Required,
        description: "Confidence in this analysis from 0 to 100. Use a low but non-zero value when information is sparse.",
    },
    FieldSpec {
        name: "riskScore",
        kind: FieldKind::Number { min: 1.0, max: 5.0 },
        presence: Presence::Optional,
        description: "Overall risk from 1 (low) to 5 (high).",
    },
    FieldSpec {
        name: "riskLevel",
        kind: FieldKind::String,
        presence: Presence::Optional,
        description: "Risk label matching riskScore, e.g. Low, Moderate, High.",
    },
    FieldSpec {
        name: "alternatives",
        kind: FieldKind::StringList {
            max_items: Some(MAX_ALTERNATIVES),
        },
        presence: Presence::Optional,
        description: "Up to four healthier alternative products.",
    },
    FieldSpec {
        name: "sources",
        kind: FieldKind::StringList { max_items: None },
        presence: Presence::Defaulted,
        description: "Databases, studies or regulators the analysis relies on.",
    },
];

pub const SEARCH_RESULT_FIELDS: &[FieldSpec] = &[FieldSpec {
    name: "results",
    kind: FieldKind::StringList {
        max_items: Some(MAX_SEARCH_RESULTS),
    },
    presence: Presence::Required,
    description: "Up to ten product names matching the query, most likely first.",
}];

impl FieldKind {
    /// Short type description used in the local field guide.
    pub fn label(&self) -> String {
        match self {
            FieldKind::String => "string".to_string(),
            FieldKind::Number { min, max } => format!("number from {min} to {max}"),
            FieldKind::Enum(values) => format!("one of: {}", values.join(" | ")),
            FieldKind::StringList { max_items: Some(max) } => {
                format!("array of strings, at most {max}")
            }
            FieldKind::StringList { max_items: None } => "array of strings".to_string(),
            FieldKind::ObjectList(_) => "array of objects".to_string(),
        }
    }

    fn empty_value(&self) -> Value {
        match self {
            FieldKind::StringList { .. } | FieldKind::ObjectList(_) => Value::Array(Vec::new()),
            _ => Value::String(String::new()),
        }
    }
}

/// JSON schema for the analysis report, derived from [`ANALYSIS_RESULT_FIELDS`].
pub fn analysis_result_schema() -> Value {
    object_schema(ANALYSIS_RESULT_FIELDS)
}

pub fn search_result_schema() -> Value {
    object_schema(SEARCH_RESULT_FIELDS)
}

pub fn object_schema(fields: &[FieldSpec]) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for field in fields {
        properties.insert(field.name.to_string(), field_schema(field));
        if field.presence != Presence::Optional {
            required.push(Value::String(field.name.to_string()));
        }
    }

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

fn field_schema(field: &FieldSpec) -> Value {
    let mut schema = match field.kind {
        FieldKind::String => json!({ "type": "string" }),
        FieldKind::Number { .. } => json!({ "type": "number" }),
        FieldKind::Enum(values) => json!({ "type": "string", "enum": values }),
        FieldKind::StringList { .. } => json!({
            "type": "array",
            "items": { "type": "string" }
        }),
        FieldKind::ObjectList(fields) => json!({
            "type": "array",
            "items": object_schema(fields)
        }),
    };
    schema["description"] = Value::String(field.description.to_string());
    schema
}

pub fn analysis_field(name: &str) -> Option<&'static FieldSpec> {
    ANALYSIS_RESULT_FIELDS.iter().find(|field| field.name == name)
}

/// Checks `candidate` against the report contract, repairing what can be
/// repaired in place (stringified numbers, nulls on optional fields, enum
/// spelling, over-long lists). Every remaining problem is reported.
pub fn validate(candidate: &Value) -> Result<AnalysisResult, ValidationErrors> {
    let mut repaired = candidate.clone();
    let mut errors = ValidationErrors::default();
    check_object(ANALYSIS_RESULT_FIELDS, &mut repaired, "", &mut errors);

    if !errors.is_empty() {
        return Err(errors);
    }

    serde_json::from_value(repaired).map_err(|e| {
        let mut errors = ValidationErrors::default();
        errors.push(FieldError::new("$", e.to_string()));
        errors
    })
}

pub fn validate_search(candidate: &Value) -> Result<SearchResult, ValidationErrors> {
    // A bare array of names is accepted as the results list.
    let mut repaired = match candidate {
        Value::Array(items) => json!({ "results": items }),
        other => other.clone(),
    };
    let mut errors = ValidationErrors::default();
    check_object(SEARCH_RESULT_FIELDS, &mut repaired, "", &mut errors);

    if !errors.is_empty() {
        return Err(errors);
    }

    let mut result: SearchResult = serde_json::from_value(repaired).map_err(|e| {
        let mut errors = ValidationErrors::default();
        errors.push(FieldError::new("$", e.to_string()));
        errors
    })?;
    result.results = result
        .results
        .into_iter()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect();

    Ok(result)
}

/// Validates a single top-level value for `field`, returning the repaired value.
pub fn check_field(field: &FieldSpec, value: &Value) -> Result<Value, ValidationErrors> {
    let mut repaired = value.clone();
    let mut errors = ValidationErrors::default();
    check_value(field, &mut repaired, field.name, &mut errors);

    if errors.is_empty() {
        Ok(repaired)
    } else {
        Err(errors)
    }
}

fn check_object(fields: &[FieldSpec], value: &mut Value, path: &str, errors: &mut ValidationErrors) {
    let Some(object) = value.as_object_mut() else {
        let location = if path.is_empty() { "$" } else { path };
        errors.push(FieldError::new(location, "expected an object"));
        return;
    };

    for field in fields {
        let field_path = if path.is_empty() {
            field.name.to_string()
        } else {
            format!("{path}.{}", field.name)
        };

        let present = object.get(field.name).is_some_and(|v| !v.is_null());
        if present {
            if let Some(slot) = object.get_mut(field.name) {
                check_value(field, slot, &field_path, errors);
            }
            continue;
        }

        object.remove(field.name);
        match field.presence {
            Presence::Required => errors.push(FieldError::new(field_path, "is required")),
            Presence::Defaulted => {
                object.insert(field.name.to_string(), field.kind.empty_value());
            }
            Presence::Optional => {}
        }
    }
}

fn check_value(field: &FieldSpec, value: &mut Value, path: &str, errors: &mut ValidationErrors) {
    match field.kind {
        FieldKind::String => {
            if let Some(text) = coerce_string(value) {
                *value = Value::String(text);
            } else if let Some(items) = string_items(value) {
                *value = Value::String(items.join("; "));
            } else {
                errors.push(FieldError::new(path, "expected a string"));
            }
        }
        FieldKind::Number { min, max } => {
            let number = match &*value {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
                _ => None,
            };
            match number {
                Some(n) if n.is_finite() && (min..=max).contains(&n) => *value = json!(n),
                Some(_) => errors.push(FieldError::new(
                    path,
                    format!("must be between {min} and {max}"),
                )),
                None => errors.push(FieldError::new(path, "expected a number")),
            }
        }
        FieldKind::Enum(allowed) => {
            let normalized = value.as_str().map(normalize_enum_value);
            match normalized.and_then(|n| allowed.iter().find(|a| **a == n)) {
                Some(variant) => *value = Value::String(variant.to_string()),
                None => errors.push(FieldError::new(
                    path,
                    format!("must be one of {}", allowed.join(", ")),
                )),
            }
        }
        FieldKind::StringList { max_items } => {
            if let Some(single) = value.as_str().map(str::to_string) {
                *value = Value::Array(vec![Value::String(single)]);
            }
            let Some(items) = value.as_array_mut() else {
                errors.push(FieldError::new(path, "expected an array of strings"));
                return;
            };
            for (i, item) in items.iter_mut().enumerate() {
                match coerce_string(item) {
                    Some(text) => *item = Value::String(text),
                    None => errors.push(FieldError::new(format!("{path}[{i}]"), "expected a string")),
                }
            }
            if let Some(max) = max_items {
                items.truncate(max);
            }
        }
        FieldKind::ObjectList(fields) => {
            let Some(items) = value.as_array_mut() else {
                errors.push(FieldError::new(path, "expected an array"));
                return;
            };
            for (i, item) in items.iter_mut().enumerate() {
                check_object(fields, item, &format!("{path}[{i}]"), errors);
            }
        }
    }
}

fn coerce_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn string_items(value: &Value) -> Option<Vec<String>> {
    value
        .as_array()?
        .iter()
        .map(|item| item.as_str().map(str::to_string))
        .collect()
}

fn normalize_enum_value(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .replace(['_', ' '], "-")
}
