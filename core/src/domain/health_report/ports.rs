use crate::domain::{
    common::entities::app_errors::CoreError,
    health_report::{
        entities::{AnalysisOutcome, AnalysisRequest, SearchOutcome, SearchRequest},
        value_objects::GenerationRequest,
    },
    provider::entities::{ProviderDescriptor, ProviderId},
};

/// Backend adapter: one round-trip to an AI provider.
///
/// `Ok(None)` means the provider answered but produced no output, which the
/// orchestrator treats like an incomplete answer rather than an error.
#[cfg_attr(test, mockall::automock)]
pub trait LLMClient: Send + Sync {
    fn generate(
        &self,
        request: GenerationRequest,
    ) -> impl Future<Output = Result<Option<serde_json::Value>, CoreError>> + Send;
}

/// Entry point used by the HTTP layer. Never fails: every error is folded
/// into a degraded outcome.
pub trait HealthReportService: Send + Sync {
    fn analyze(&self, request: AnalysisRequest) -> impl Future<Output = AnalysisOutcome> + Send;

    fn search(&self, request: SearchRequest) -> impl Future<Output = SearchOutcome> + Send;

    fn providers(&self) -> Vec<ProviderDescriptor>;

    fn default_provider(&self) -> ProviderId;
}
