use chrono::{DateTime, Utc};
use uuid::{NoContext, Timestamp, Uuid};

use crate::domain::provider::entities::ProviderId;

pub mod entities;
pub mod services;

#[derive(Clone, Debug)]
pub struct LabelLensConfig {
    pub llm: LLMConfig,
}

#[derive(Clone, Debug)]
pub struct LLMConfig {
    /// Selects `local` as the default provider instead of `hosted-a`.
    pub use_local_model: bool,
    pub ollama_url: String,
    pub local_model_name: String,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub anthropic_api_key: Option<String>,
    pub anthropic_model: String,
    pub request_timeout_secs: u64,
}

impl LLMConfig {
    pub fn default_provider(&self) -> ProviderId {
        if self.use_local_model {
            ProviderId::Local
        } else {
            ProviderId::HostedA
        }
    }
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            use_local_model: false,
            ollama_url: "http://localhost:11434".to_string(),
            local_model_name: ProviderId::Local.default_model().to_string(),
            gemini_api_key: None,
            gemini_model: ProviderId::HostedA.default_model().to_string(),
            openai_api_key: None,
            openai_model: ProviderId::HostedB.default_model().to_string(),
            anthropic_api_key: None,
            anthropic_model: ProviderId::HostedC.default_model().to_string(),
            request_timeout_secs: 120,
        }
    }
}

pub fn generate_timestamp() -> (DateTime<Utc>, Timestamp) {
    let now = Utc::now();
    let seconds = now.timestamp().try_into().unwrap_or(0);
    let timestamp = Timestamp::from_unix(NoContext, seconds, 0);

    (now, timestamp)
}

pub fn generate_uuid_v7() -> Uuid {
    let (_, timestamp) = generate_timestamp();
    Uuid::new_v7(timestamp)
}
