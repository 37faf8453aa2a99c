use serde_json::Value;

use crate::domain::{
    common::{entities::app_errors::CoreError, generate_uuid_v7, services::Service},
    health_report::{
        entities::{
            AnalysisOutcome, AnalysisRequest, AnalysisResult, FailureKind, SearchOutcome,
            SearchRequest,
        },
        ports::{HealthReportService, LLMClient},
        prompts,
        schema,
        validator::{self, FAILED_MARKER, INCOMPLETE_MARKER},
        value_objects::{GenerationRequest, PromptData},
    },
    provider::entities::{BackendKind, ProviderDescriptor, ProviderId, Route},
};

/// Initial attempt plus one retry.
pub const MAX_ATTEMPTS: usize = 2;

const ESSENTIAL_FIELDS: [&str; 2] = ["summary", "ingredients"];

struct Rejection {
    kind: FailureKind,
    reason: String,
    fields: Vec<String>,
    raw: Option<Value>,
}

enum AttemptVerdict<T> {
    Usable(T),
    Rejected(Rejection),
}

impl<L, H> HealthReportService for Service<L, H>
where
    L: LLMClient,
    H: LLMClient,
{
    #[tracing::instrument(
        skip(self, request),
        fields(
            request_id = %generate_uuid_v7(),
            provider = %request.provider_id,
            image = request.is_image()
        )
    )]
    async fn analyze(&self, request: AnalysisRequest) -> AnalysisOutcome {
        let provider = request.provider_id;
        let route = match self
            .registry
            .resolve(provider, request.local_model_name.as_deref())
        {
            Ok(route) => route,
            Err(error) => {
                tracing::warn!(error = %error, "Rejected analysis before calling a backend");
                return degraded_analysis(provider, &error);
            }
        };

        let mut rejected_fields: Vec<String> = Vec::new();
        let mut attempt = 1;

        let rejection = loop {
            let prompt = prompts::build_analysis_prompt(
                provider.kind(),
                &request.product_info,
                request.region_hint.as_deref(),
                &rejected_fields,
            );
            let output = match self
                .invoke(&route, prompt, schema::analysis_result_schema(), "health_report")
                .await
            {
                Ok(output) => output,
                Err(error) => {
                    tracing::error!(attempt, model = %route.model, error = %error, "Backend call failed");
                    return degraded_analysis(provider, &error);
                }
            };

            match evaluate_analysis(output, provider) {
                AttemptVerdict::Usable(value) => {
                    tracing::info!(
                        attempt,
                        ingredients = value.ingredients.len(),
                        confidence = value.confidence_score,
                        "Analysis completed"
                    );
                    return AnalysisOutcome::Completed { value };
                }
                AttemptVerdict::Rejected(rejection) => {
                    tracing::warn!(
                        attempt,
                        kind = ?rejection.kind,
                        reason = %rejection.reason,
                        "Backend output rejected"
                    );
                    if attempt >= MAX_ATTEMPTS {
                        break rejection;
                    }
                    rejected_fields = rejection.fields;
                    attempt += 1;
                }
            }
        };

        let summary = format!(
            "{INCOMPLETE_MARKER} the AI response was still unusable after a retry ({}).",
            rejection.reason
        );
        let value = validator::merge_partial(
            validator::default_result(provider, summary),
            rejection.raw.as_ref(),
        );

        AnalysisOutcome::Degraded {
            kind: rejection.kind,
            message: rejection.reason,
            value,
        }
    }

    #[tracing::instrument(
        skip(self, request),
        fields(request_id = %generate_uuid_v7(), provider = %request.provider_id)
    )]
    async fn search(&self, request: SearchRequest) -> SearchOutcome {
        let route = match self
            .registry
            .resolve(request.provider_id, request.local_model_name.as_deref())
        {
            Ok(route) => route,
            Err(error) => return degraded_search(&error),
        };

        let mut rejected_fields: Vec<String> = Vec::new();
        let mut attempt = 1;

        let rejection = loop {
            let prompt =
                prompts::build_search_prompt(route.provider.kind(), &request.name, &rejected_fields);
            let output = match self
                .invoke(&route, prompt, schema::search_result_schema(), "product_search")
                .await
            {
                Ok(output) => output,
                Err(error) => {
                    tracing::error!(attempt, error = %error, "Search backend call failed");
                    return degraded_search(&error);
                }
            };

            match evaluate_search(output) {
                AttemptVerdict::Usable(results) => {
                    tracing::info!(attempt, results = results.len(), "Search completed");
                    return SearchOutcome::Completed { results };
                }
                AttemptVerdict::Rejected(rejection) => {
                    tracing::warn!(attempt, reason = %rejection.reason, "Search output rejected");
                    if attempt >= MAX_ATTEMPTS {
                        break rejection;
                    }
                    rejected_fields = rejection.fields;
                    attempt += 1;
                }
            }
        };

        SearchOutcome::Degraded {
            kind: rejection.kind,
            message: rejection.reason,
            results: Vec::new(),
        }
    }

    fn providers(&self) -> Vec<ProviderDescriptor> {
        self.registry.descriptors()
    }

    fn default_provider(&self) -> ProviderId {
        self.registry.default_provider()
    }
}

impl<L, H> Service<L, H>
where
    L: LLMClient,
    H: LLMClient,
{
    async fn invoke(
        &self,
        route: &Route,
        prompt: PromptData,
        response_schema: Value,
        schema_name: &'static str,
    ) -> Result<Option<Value>, CoreError> {
        let request = GenerationRequest {
            provider: route.provider,
            model: route.model.clone(),
            prompt,
            response_schema,
            schema_name,
        };

        match route.provider.kind() {
            BackendKind::Local => self.local_backend.generate(request).await,
            BackendKind::Hosted => self.hosted_backend.generate(request).await,
        }
    }
}

fn evaluate_analysis(
    output: Option<Value>,
    provider: ProviderId,
) -> AttemptVerdict<AnalysisResult> {
    let Some(raw) = output else {
        return AttemptVerdict::Rejected(Rejection {
            kind: FailureKind::Incomplete,
            reason: "backend returned no output".to_string(),
            fields: ESSENTIAL_FIELDS.iter().map(|f| f.to_string()).collect(),
            raw: None,
        });
    };

    let missing = missing_essentials(&raw);
    match validator::validate(&raw, provider) {
        Ok(result) if result.is_complete() => AttemptVerdict::Usable(result),
        Ok(result) => {
            let missing = result.missing_essentials();
            AttemptVerdict::Rejected(Rejection {
                kind: FailureKind::Incomplete,
                reason: format!("missing {}", missing.join(", ")),
                fields: missing,
                raw: Some(raw),
            })
        }
        Err(errors) => {
            let mut fields = missing.clone();
            for field in errors.fields() {
                if !fields.contains(&field) {
                    fields.push(field);
                }
            }
            let kind = if missing.is_empty() {
                FailureKind::Schema
            } else {
                FailureKind::Incomplete
            };
            AttemptVerdict::Rejected(Rejection {
                kind,
                reason: errors.to_string(),
                fields,
                raw: Some(raw),
            })
        }
    }
}

fn evaluate_search(output: Option<Value>) -> AttemptVerdict<Vec<String>> {
    let Some(raw) = output else {
        return AttemptVerdict::Rejected(Rejection {
            kind: FailureKind::Incomplete,
            reason: "backend returned no output".to_string(),
            fields: vec!["results".to_string()],
            raw: None,
        });
    };

    match schema::validate_search(&raw) {
        Ok(result) => AttemptVerdict::Usable(result.results),
        Err(errors) => AttemptVerdict::Rejected(Rejection {
            kind: FailureKind::Schema,
            reason: errors.to_string(),
            fields: errors.fields(),
            raw: Some(raw),
        }),
    }
}

/// Essential fields absent or empty in the raw candidate, before any
/// schema checks.
fn missing_essentials(raw: &Value) -> Vec<String> {
    let summary_present = raw
        .get("summary")
        .and_then(Value::as_str)
        .is_some_and(|s| !s.trim().is_empty());
    let ingredients_present = raw
        .get("ingredients")
        .and_then(Value::as_array)
        .is_some_and(|items| !items.is_empty());

    ESSENTIAL_FIELDS
        .iter()
        .zip([summary_present, ingredients_present])
        .filter(|(_, present)| !present)
        .map(|(name, _)| name.to_string())
        .collect()
}

fn degraded_analysis(provider: ProviderId, error: &CoreError) -> AnalysisOutcome {
    let message = error.to_string();
    let value = validator::default_result(provider, format!("{FAILED_MARKER} {message}"));

    AnalysisOutcome::Degraded {
        kind: FailureKind::from(error),
        message,
        value,
    }
}

fn degraded_search(error: &CoreError) -> SearchOutcome {
    SearchOutcome::Degraded {
        kind: FailureKind::from(error),
        message: error.to_string(),
        results: Vec::new(),
    }
}
