use std::sync::Arc;

use crate::domain::{health_report::ports::LLMClient, provider::registry::ProviderRegistry};

/// Orchestrator state shared by every request: the two backend adapters and
/// the provider registry built at startup.
pub struct Service<L, H>
where
    L: LLMClient,
    H: LLMClient,
{
    pub(crate) local_backend: Arc<L>,
    pub(crate) hosted_backend: Arc<H>,
    pub(crate) registry: Arc<ProviderRegistry>,
}

impl<L, H> Service<L, H>
where
    L: LLMClient,
    H: LLMClient,
{
    pub fn new(local_backend: L, hosted_backend: H, registry: ProviderRegistry) -> Self {
        Self {
            local_backend: Arc::new(local_backend),
            hosted_backend: Arc::new(hosted_backend),
            registry: Arc::new(registry),
        }
    }
}

impl<L, H> Clone for Service<L, H>
where
    L: LLMClient,
    H: LLMClient,
{
    fn clone(&self) -> Self {
        Self {
            local_backend: Arc::clone(&self.local_backend),
            hosted_backend: Arc::clone(&self.hosted_backend),
            registry: Arc::clone(&self.registry),
        }
    }
}
