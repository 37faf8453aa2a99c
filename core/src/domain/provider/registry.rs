use std::collections::BTreeMap;

use crate::domain::{
    common::entities::app_errors::CoreError,
    provider::entities::{ProviderDescriptor, ProviderId, Route},
};

/// Providers available to this process, fixed at startup.
///
/// A hosted provider whose credentials were missing at startup is never
/// registered, so requests routed to it fail before any network call.
#[derive(Debug, Clone)]
pub struct ProviderRegistry {
    providers: BTreeMap<ProviderId, ProviderDescriptor>,
    default_provider: ProviderId,
}

impl ProviderRegistry {
    pub fn new(default_provider: ProviderId) -> Self {
        Self {
            providers: BTreeMap::new(),
            default_provider,
        }
    }

    pub fn register(&mut self, descriptor: ProviderDescriptor) {
        tracing::info!(
            provider = %descriptor.id,
            model = %descriptor.default_model,
            "Registered AI provider"
        );
        self.providers.insert(descriptor.id, descriptor);
    }

    pub fn default_provider(&self) -> ProviderId {
        self.default_provider
    }

    pub fn is_registered(&self, provider: ProviderId) -> bool {
        self.providers.contains_key(&provider)
    }

    pub fn descriptors(&self) -> Vec<ProviderDescriptor> {
        self.providers.values().cloned().collect()
    }

    /// Picks the model for `provider`. The local model name only applies to
    /// the local backend and is ignored for hosted providers.
    pub fn resolve(
        &self,
        provider: ProviderId,
        local_model_name: Option<&str>,
    ) -> Result<Route, CoreError> {
        let descriptor = self.providers.get(&provider).ok_or_else(|| {
            CoreError::ProviderNotConfigured(format!(
                "{} ({}): credentials are missing or the provider is disabled",
                provider,
                provider.display_name()
            ))
        })?;

        let model = match (provider, local_model_name.map(str::trim)) {
            (ProviderId::Local, Some(name)) if !name.is_empty() => name.to_string(),
            _ => descriptor.default_model.clone(),
        };

        Ok(Route { provider, model })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> ProviderRegistry {
        let mut registry = ProviderRegistry::new(ProviderId::Local);
        registry.register(ProviderDescriptor::new(ProviderId::Local, "llama3.1"));
        registry.register(ProviderDescriptor::new(
            ProviderId::HostedA,
            "gemini-1.5-flash",
        ));
        registry
    }

    #[test]
    fn test_resolve_uses_local_override() {
        let route = registry()
            .resolve(ProviderId::Local, Some("mistral"))
            .unwrap();
        assert_eq!(route.model, "mistral");
    }

    #[test]
    fn test_resolve_ignores_local_model_for_hosted() {
        let route = registry()
            .resolve(ProviderId::HostedA, Some("mistral"))
            .unwrap();
        assert_eq!(route.model, "gemini-1.5-flash");
    }

    #[test]
    fn test_resolve_blank_override_falls_back_to_default() {
        let route = registry().resolve(ProviderId::Local, Some("  ")).unwrap();
        assert_eq!(route.model, "llama3.1");
    }

    #[test]
    fn test_resolve_unregistered_provider_is_configuration_error() {
        let err = registry().resolve(ProviderId::HostedB, None).unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("hosted-b"));
    }
}
