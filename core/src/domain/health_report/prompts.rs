use std::sync::LazyLock;

use regex::Regex;

use crate::domain::{
    health_report::{
        schema::{ANALYSIS_RESULT_FIELDS, FieldKind, FieldSpec, Presence, SEARCH_RESULT_FIELDS},
        value_objects::{MediaPart, PromptData},
    },
    provider::entities::BackendKind,
};

pub const ANALYSIS_TEMPLATE: &str = r#"You are an expert food scientist and nutritionist. Analyze the following food product and produce a health report for a consumer.

Product information: {{productInfo}}
{{#if regionHint}}
The user is in {{regionHint}}. Analyze the formulation sold in {{regionHint}} and compare it with the formulations of the same brand sold in other major markets such as the EU, UK and US. If the {{regionHint}} formulation is materially worse than another region's, explain the difference in the warning field.
{{/if}}
Cover every significant ingredient: its purpose, its health effects and a safety level. Comment on packaging materials and additives, summarize the overall nutritional profile and the regulatory status, and suggest healthier alternatives where they exist.
Base the analysis on established sources such as Open Food Facts, USDA FoodData Central, EFSA, FSSAI, FDA and peer-reviewed research, and list the ones you relied on in sources.
Set confidenceScore to reflect how certain you are about the product's formulation."#;

pub const SEARCH_TEMPLATE: &str = r#"You are a food product catalogue assistant. List packaged food products whose name matches or closely resembles the query below, including brand and variant where known.

Query: {{query}}

Return the most likely matches first."#;

const IMAGE_REFERENCE: &str = "the product shown in the attached label image";

const JSON_DIRECTIVE: &str = "Respond with a single raw JSON object and nothing else. Do not wrap it in markdown code fences and do not add any text before or after it.";

static REGION_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\{\{#if regionHint\}\}\n?(.*?)\{\{/if\}\}\n?").expect("valid regex")
});

/// Renders the analysis prompt for `kind`. `rejected_fields` is non-empty
/// on a retry and names what the previous attempt got wrong.
pub fn build_analysis_prompt(
    kind: BackendKind,
    product_info: &str,
    region_hint: Option<&str>,
    rejected_fields: &[String],
) -> PromptData {
    let media = match kind {
        BackendKind::Hosted => MediaPart::from_data_uri(product_info),
        BackendKind::Local => None,
    };
    let product_text = if media.is_some() {
        IMAGE_REFERENCE
    } else {
        product_info
    };

    let mut text = render_region_block(ANALYSIS_TEMPLATE, region_hint)
        .replace("{{productInfo}}", product_text);

    if kind == BackendKind::Local {
        text.push_str("\n\n");
        text.push_str(&output_directive(ANALYSIS_RESULT_FIELDS));
    }
    append_retry_note(&mut text, rejected_fields);

    PromptData { text, media }
}

pub fn build_search_prompt(kind: BackendKind, query: &str, rejected_fields: &[String]) -> PromptData {
    let mut text = SEARCH_TEMPLATE.replace("{{query}}", query);

    if kind == BackendKind::Local {
        text.push_str("\n\n");
        text.push_str(&output_directive(SEARCH_RESULT_FIELDS));
    }
    append_retry_note(&mut text, rejected_fields);

    PromptData { text, media: None }
}

/// Keeps the conditional region block (minus its markers) when a hint is
/// present, drops it entirely otherwise.
fn render_region_block(template: &str, region_hint: Option<&str>) -> String {
    match region_hint.map(str::trim).filter(|hint| !hint.is_empty()) {
        Some(hint) => REGION_BLOCK
            .replace_all(template, "$1")
            .replace("{{regionHint}}", hint),
        None => REGION_BLOCK.replace_all(template, "").into_owned(),
    }
}

fn output_directive(fields: &[FieldSpec]) -> String {
    let mut directive = String::from(JSON_DIRECTIVE);
    directive.push_str("\nThe JSON object must have these fields:\n");
    write_field_guide(&mut directive, fields, 0);
    directive
}

/// Field guide generated from the schema table, one line per field.
fn write_field_guide(out: &mut String, fields: &[FieldSpec], depth: usize) {
    let indent = "  ".repeat(depth);
    for field in fields {
        let presence = match field.presence {
            Presence::Optional => "optional",
            Presence::Required | Presence::Defaulted => "required",
        };
        out.push_str(&format!(
            "{indent}- {} ({}, {}): {}\n",
            field.name,
            field.kind.label(),
            presence,
            field.description
        ));
        if let FieldKind::ObjectList(nested) = field.kind {
            write_field_guide(out, nested, depth + 1);
        }
    }
}

fn append_retry_note(text: &mut String, rejected_fields: &[String]) {
    if rejected_fields.is_empty() {
        return;
    }
    text.push_str(&format!(
        "\n\nYour previous answer was rejected because these fields were missing, empty or invalid: {}. Include every required field this time.",
        rejected_fields.join(", ")
    ));
}
