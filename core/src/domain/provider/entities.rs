use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Routing key selecting the backend adapter and model for a request.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderId {
    Local,
    HostedA,
    HostedB,
    HostedC,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Local,
    Hosted,
}

impl ProviderId {
    pub const ALL: [ProviderId; 4] = [
        ProviderId::Local,
        ProviderId::HostedA,
        ProviderId::HostedB,
        ProviderId::HostedC,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::Local => "local",
            ProviderId::HostedA => "hosted-a",
            ProviderId::HostedB => "hosted-b",
            ProviderId::HostedC => "hosted-c",
        }
    }

    pub fn kind(&self) -> BackendKind {
        match self {
            ProviderId::Local => BackendKind::Local,
            _ => BackendKind::Hosted,
        }
    }

    /// Human-readable provider name, also used as the fallback `sources` entry.
    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderId::Local => "Ollama (local model)",
            ProviderId::HostedA => "Google Gemini",
            ProviderId::HostedB => "OpenAI",
            ProviderId::HostedC => "Anthropic Claude",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderId::Local => "llama3.1",
            ProviderId::HostedA => "gemini-1.5-flash",
            ProviderId::HostedB => "gpt-4o-mini",
            ProviderId::HostedC => "claude-3-5-sonnet-latest",
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProviderId::ALL
            .into_iter()
            .find(|id| id.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unsupported provider: {s}"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProviderDescriptor {
    pub id: ProviderId,
    pub display_name: String,
    pub kind: BackendKind,
    pub default_model: String,
}

impl ProviderDescriptor {
    pub fn new(id: ProviderId, default_model: impl Into<String>) -> Self {
        Self {
            id,
            display_name: id.display_name().to_string(),
            kind: id.kind(),
            default_model: default_model.into(),
        }
    }
}

/// Concrete provider and model chosen for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub provider: ProviderId,
    pub model: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_id_serializes_kebab_case() {
        assert_eq!(
            serde_json::to_string(&ProviderId::HostedA).unwrap(),
            "\"hosted-a\""
        );
        let parsed: ProviderId = serde_json::from_str("\"hosted-c\"").unwrap();
        assert_eq!(parsed, ProviderId::HostedC);
    }

    #[test]
    fn test_provider_id_from_str() {
        assert_eq!("LOCAL".parse::<ProviderId>(), Ok(ProviderId::Local));
        assert_eq!(" hosted-b ".parse::<ProviderId>(), Ok(ProviderId::HostedB));
        assert!("hosted-z".parse::<ProviderId>().is_err());
    }
}
