use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("Provider {0} is not configured")]
    ProviderNotConfigured(String),

    #[error("{provider} request failed: {message}")]
    ExternalServiceError { provider: String, message: String },

    #[error("{provider} returned error: {status} - {body}")]
    UnexpectedStatus {
        provider: String,
        status: u16,
        body: String,
    },

    #[error("Failed to parse {field} as JSON: {message} (raw: {raw})")]
    ParseError {
        field: String,
        message: String,
        raw: String,
    },

    #[error("Unrecognized response envelope: {0}")]
    UnrecognizedEnvelope(String),
}

impl CoreError {
    pub fn is_configuration(&self) -> bool {
        matches!(self, CoreError::ProviderNotConfigured(_))
    }

    pub fn is_parse(&self) -> bool {
        matches!(
            self,
            CoreError::ParseError { .. } | CoreError::UnrecognizedEnvelope(_)
        )
    }
}
