use std::collections::BTreeMap;

use reqwest::Client;
use serde_json::Value;

use crate::{
    domain::{
        common::{LLMConfig, entities::app_errors::CoreError},
        health_report::{ports::LLMClient, value_objects::GenerationRequest},
        provider::{
            entities::{ProviderDescriptor, ProviderId},
            registry::ProviderRegistry,
        },
    },
    infrastructure::llm::{AnthropicLLMClient, GeminiLLMClient, OpenAILLMClient},
};

#[derive(Debug, Clone)]
pub enum HostedClient {
    Gemini(GeminiLLMClient),
    OpenAI(OpenAILLMClient),
    Anthropic(AnthropicLLMClient),
}

impl HostedClient {
    async fn generate(&self, request: GenerationRequest) -> Result<Option<Value>, CoreError> {
        match self {
            HostedClient::Gemini(client) => client.generate(request).await,
            HostedClient::OpenAI(client) => client.generate(request).await,
            HostedClient::Anthropic(client) => client.generate(request).await,
        }
    }
}

struct HostedProviderSpec {
    id: ProviderId,
    credential_env: &'static str,
    credential: fn(&LLMConfig) -> Option<&str>,
    model: fn(&LLMConfig) -> &str,
    build: fn(String, Client) -> HostedClient,
}

static HOSTED_PROVIDERS: &[HostedProviderSpec] = &[
    HostedProviderSpec {
        id: ProviderId::HostedA,
        credential_env: "GEMINI_API_KEY",
        credential: |config| config.gemini_api_key.as_deref(),
        model: |config| &config.gemini_model,
        build: |key, client| HostedClient::Gemini(GeminiLLMClient::new(key, client)),
    },
    HostedProviderSpec {
        id: ProviderId::HostedB,
        credential_env: "OPENAI_API_KEY",
        credential: |config| config.openai_api_key.as_deref(),
        model: |config| &config.openai_model,
        build: |key, client| HostedClient::OpenAI(OpenAILLMClient::new(key, client)),
    },
    HostedProviderSpec {
        id: ProviderId::HostedC,
        credential_env: "ANTHROPIC_API_KEY",
        credential: |config| config.anthropic_api_key.as_deref(),
        model: |config| &config.anthropic_model,
        build: |key, client| HostedClient::Anthropic(AnthropicLLMClient::new(key, client)),
    },
];

/// Dispatches hosted requests to the client registered for their provider.
#[derive(Debug, Clone, Default)]
pub struct HostedBackend {
    clients: BTreeMap<ProviderId, HostedClient>,
}

impl HostedBackend {
    /// Builds a client for every hosted provider whose credential is set and
    /// registers it. Providers without credentials are skipped.
    pub fn from_config(config: &LLMConfig, client: Client, registry: &mut ProviderRegistry) -> Self {
        let mut backend = Self::default();

        for spec in HOSTED_PROVIDERS {
            let Some(key) = (spec.credential)(config)
                .map(str::trim)
                .filter(|key| !key.is_empty())
            else {
                tracing::warn!(
                    provider = %spec.id,
                    "{} is not set, {} will be unavailable",
                    spec.credential_env,
                    spec.id.display_name()
                );
                continue;
            };

            let model = (spec.model)(config);
            let model = if model.trim().is_empty() {
                spec.id.default_model()
            } else {
                model
            };

            registry.register(ProviderDescriptor::new(spec.id, model));
            backend.insert(spec.id, (spec.build)(key.to_string(), client.clone()));
        }

        backend
    }

    pub fn insert(&mut self, provider: ProviderId, client: HostedClient) {
        self.clients.insert(provider, client);
    }

    pub fn providers(&self) -> Vec<ProviderId> {
        self.clients.keys().copied().collect()
    }
}

impl LLMClient for HostedBackend {
    async fn generate(&self, request: GenerationRequest) -> Result<Option<Value>, CoreError> {
        let client = self.clients.get(&request.provider).ok_or_else(|| {
            CoreError::ProviderNotConfigured(format!(
                "{} has no hosted client",
                request.provider
            ))
        })?;

        client.generate(request).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::health_report::value_objects::PromptData;

    #[test]
    fn test_only_providers_with_credentials_are_registered() {
        let config = LLMConfig {
            gemini_api_key: Some("gm-key".to_string()),
            openai_api_key: Some("   ".to_string()),
            anthropic_api_key: Some("sk-ant".to_string()),
            anthropic_model: "claude-3-haiku-20240307".to_string(),
            ..LLMConfig::default()
        };
        let mut registry = ProviderRegistry::new(ProviderId::HostedA);

        let backend = HostedBackend::from_config(&config, Client::new(), &mut registry);

        assert_eq!(backend.providers(), vec![ProviderId::HostedA, ProviderId::HostedC]);
        assert!(registry.is_registered(ProviderId::HostedA));
        assert!(!registry.is_registered(ProviderId::HostedB));
        let route = registry.resolve(ProviderId::HostedC, None).unwrap();
        assert_eq!(route.model, "claude-3-haiku-20240307");
    }

    #[test]
    fn test_no_credentials_registers_nothing() {
        let mut registry = ProviderRegistry::new(ProviderId::HostedA);
        let backend = HostedBackend::from_config(&LLMConfig::default(), Client::new(), &mut registry);

        assert!(backend.providers().is_empty());
        assert!(registry.descriptors().is_empty());
    }

    #[tokio::test]
    async fn test_unregistered_provider_fails_fast() {
        let backend = HostedBackend::default();
        let request = GenerationRequest {
            provider: ProviderId::HostedB,
            model: "gpt-4o-mini".to_string(),
            prompt: PromptData {
                text: "hi".to_string(),
                media: None,
            },
            response_schema: json!({}),
            schema_name: "health_report",
        };

        let error = backend.generate(request).await.unwrap_err();

        assert!(error.is_configuration());
    }
}
