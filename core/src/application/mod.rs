use std::time::Duration;

use crate::{
    domain::{
        common::{LabelLensConfig, services::Service},
        provider::{
            entities::{ProviderDescriptor, ProviderId},
            registry::ProviderRegistry,
        },
    },
    infrastructure::llm::{HostedBackend, OllamaLLMClient},
};

pub type LabelLensService = Service<OllamaLLMClient, HostedBackend>;

/// Builds the provider registry and backend adapters from configuration.
/// Called once at startup.
pub fn create_service(config: LabelLensConfig) -> Result<LabelLensService, anyhow::Error> {
    let llm = config.llm;
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(llm.request_timeout_secs))
        .build()?;

    let default_provider = llm.default_provider();
    let mut registry = ProviderRegistry::new(default_provider);

    registry.register(ProviderDescriptor::new(
        ProviderId::Local,
        llm.local_model_name.clone(),
    ));
    let local = OllamaLLMClient::new(llm.ollama_url.clone(), client.clone());
    let hosted = HostedBackend::from_config(&llm, client, &mut registry);

    if !registry.is_registered(default_provider) {
        tracing::warn!(
            provider = %default_provider,
            "Default provider is not configured, requests without a provider will be degraded"
        );
    }

    Ok(Service::new(local, hosted, registry))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{common::LLMConfig, health_report::ports::HealthReportService};

    #[test]
    fn test_local_is_always_registered() {
        let service = create_service(LabelLensConfig {
            llm: LLMConfig::default(),
        })
        .unwrap();

        let providers: Vec<ProviderId> = service.providers().iter().map(|p| p.id).collect();
        assert_eq!(providers, vec![ProviderId::Local]);
        assert_eq!(service.default_provider(), ProviderId::HostedA);
    }

    #[test]
    fn test_use_local_model_switches_default() {
        let service = create_service(LabelLensConfig {
            llm: LLMConfig {
                use_local_model: true,
                local_model_name: "mistral".to_string(),
                openai_api_key: Some("sk-test".to_string()),
                ..LLMConfig::default()
            },
        })
        .unwrap();

        assert_eq!(service.default_provider(), ProviderId::Local);
        let providers = service.providers();
        assert_eq!(providers.len(), 2);
        assert_eq!(providers[0].default_model, "mistral");
        assert_eq!(providers[1].id, ProviderId::HostedB);
    }
}
