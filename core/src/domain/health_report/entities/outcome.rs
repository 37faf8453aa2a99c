use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    common::entities::app_errors::CoreError,
    health_report::entities::analysis_result::AnalysisResult,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    Configuration,
    Transport,
    Parse,
    Schema,
    Incomplete,
}

impl From<&CoreError> for FailureKind {
    fn from(error: &CoreError) -> Self {
        if error.is_configuration() {
            FailureKind::Configuration
        } else if error.is_parse() {
            FailureKind::Parse
        } else {
            FailureKind::Transport
        }
    }
}

/// Result of `analyze`. Both variants carry a well-formed report; a degraded
/// one also says why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum AnalysisOutcome {
    Completed {
        value: AnalysisResult,
    },
    Degraded {
        kind: FailureKind,
        message: String,
        value: AnalysisResult,
    },
}

impl AnalysisOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, AnalysisOutcome::Completed { .. })
    }

    pub fn report(&self) -> &AnalysisResult {
        match self {
            AnalysisOutcome::Completed { value } | AnalysisOutcome::Degraded { value, .. } => value,
        }
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            AnalysisOutcome::Completed { .. } => None,
            AnalysisOutcome::Degraded { kind, .. } => Some(*kind),
        }
    }
}

/// Result of `search`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SearchOutcome {
    Completed {
        results: Vec<String>,
    },
    Degraded {
        kind: FailureKind,
        message: String,
        results: Vec<String>,
    },
}

impl SearchOutcome {
    pub fn results(&self) -> &[String] {
        match self {
            SearchOutcome::Completed { results } | SearchOutcome::Degraded { results, .. } => {
                results
            }
        }
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            SearchOutcome::Completed { .. } => None,
            SearchOutcome::Degraded { kind, .. } => Some(*kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_kind_from_core_error() {
        let kind = FailureKind::from(&CoreError::ProviderNotConfigured("hosted-b".into()));
        assert_eq!(kind, FailureKind::Configuration);

        let kind = FailureKind::from(&CoreError::UnrecognizedEnvelope("{}".into()));
        assert_eq!(kind, FailureKind::Parse);

        let kind = FailureKind::from(&CoreError::UnexpectedStatus {
            provider: "OpenAI".into(),
            status: 401,
            body: "unauthorized".into(),
        });
        assert_eq!(kind, FailureKind::Transport);
    }

    #[test]
    fn test_search_outcome_is_tagged() {
        let outcome = SearchOutcome::Degraded {
            kind: FailureKind::Transport,
            message: "connection refused".to_string(),
            results: vec![],
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "degraded");
        assert_eq!(json["kind"], "transport");
        assert_eq!(json["results"], serde_json::json!([]));
    }
}
