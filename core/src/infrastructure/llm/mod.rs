use std::sync::LazyLock;

use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::domain::common::entities::app_errors::CoreError;

pub mod anthropic_client;
pub mod gemini_client;
pub mod hosted_backend;
pub mod ollama_client;
pub mod openai_client;

pub use anthropic_client::AnthropicLLMClient;
pub use gemini_client::GeminiLLMClient;
pub use hosted_backend::HostedBackend;
pub use ollama_client::OllamaLLMClient;
pub use openai_client::OpenAILLMClient;

/// Raw payloads quoted in errors are cut to this many characters.
const RAW_EXCERPT_LEN: usize = 2_000;

static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^```[a-zA-Z]*\s*(.*?)\s*```$").expect("valid regex")
});

/// Second parse pass over model text. Markdown fences are stripped and, if
/// the text still does not parse, the outermost `{...}` span is tried.
/// Blank text means the model produced nothing.
pub(crate) fn parse_json_text(field: &str, text: &str) -> Result<Option<Value>, CoreError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let unfenced = CODE_FENCE
        .captures(trimmed)
        .and_then(|captures| captures.get(1))
        .map_or(trimmed, |body| body.as_str());

    match serde_json::from_str::<Value>(unfenced) {
        Ok(value) => Ok(Some(value)),
        Err(error) => {
            if let Some(value) = outermost_object(unfenced) {
                return Ok(Some(value));
            }
            Err(CoreError::ParseError {
                field: field.to_string(),
                message: error.to_string(),
                raw: excerpt(text),
            })
        }
    }
}

fn outermost_object(text: &str) -> Option<Value> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&text[start..=end]).ok()
}

pub(crate) fn excerpt(raw: &str) -> String {
    if raw.chars().count() <= RAW_EXCERPT_LEN {
        return raw.to_string();
    }
    let mut cut: String = raw.chars().take(RAW_EXCERPT_LEN).collect();
    cut.push('…');
    cut
}

/// Maps a non-2xx answer to [`CoreError::UnexpectedStatus`], logging the body.
pub(crate) async fn ensure_success(
    provider: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response, CoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    tracing::error!(provider, status = status.as_u16(), body = %excerpt(&body), "Backend returned an error status");
    Err(CoreError::UnexpectedStatus {
        provider: provider.to_string(),
        status: status.as_u16(),
        body: excerpt(&body),
    })
}

/// Reads a successful reply and decodes it, quoting the raw body on failure.
pub(crate) async fn decode_body<T: DeserializeOwned>(
    provider: &str,
    response: reqwest::Response,
) -> Result<T, CoreError> {
    let raw = response
        .text()
        .await
        .map_err(|e| transport_error(provider, e))?;
    decode_json(provider, &raw)
}

fn decode_json<T: DeserializeOwned>(provider: &str, raw: &str) -> Result<T, CoreError> {
    serde_json::from_str(raw).map_err(|e| {
        tracing::error!(provider, error = %e, body = %excerpt(raw), "Failed to decode backend reply");
        CoreError::ParseError {
            field: "body".to_string(),
            message: e.to_string(),
            raw: excerpt(raw),
        }
    })
}

pub(crate) fn transport_error(provider: &str, error: reqwest::Error) -> CoreError {
    tracing::error!(provider, error = %error, "Backend request failed");
    CoreError::ExternalServiceError {
        provider: provider.to_string(),
        message: error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_undecodable_body_keeps_raw_excerpt() {
        let error = decode_json::<Value>("Gemini", "<html>Bad gateway</html>").unwrap_err();
        match error {
            CoreError::ParseError { field, raw, .. } => {
                assert_eq!(field, "body");
                assert_eq!(raw, "<html>Bad gateway</html>");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parses_plain_json() {
        let value = parse_json_text("text", r#"{"summary":"x"}"#).unwrap();
        assert_eq!(value, Some(json!({ "summary": "x" })));
    }

    #[test]
    fn test_strips_code_fences() {
        let text = "```json\n{\"summary\": \"x\"}\n```";
        let value = parse_json_text("text", text).unwrap();
        assert_eq!(value, Some(json!({ "summary": "x" })));
    }

    #[test]
    fn test_extracts_object_from_chatter() {
        let text = "Sure! Here is the report:\n{\"summary\": \"x\"}\nHope this helps.";
        let value = parse_json_text("text", text).unwrap();
        assert_eq!(value, Some(json!({ "summary": "x" })));
    }

    #[test]
    fn test_blank_text_is_no_output() {
        assert_eq!(parse_json_text("response", "  \n").unwrap(), None);
    }

    #[test]
    fn test_invalid_json_is_a_parse_error() {
        let error = parse_json_text("response", "not json at all").unwrap_err();
        match error {
            CoreError::ParseError { field, raw, .. } => {
                assert_eq!(field, "response");
                assert_eq!(raw, "not json at all");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_excerpt_truncates_long_payloads() {
        let long = "a".repeat(RAW_EXCERPT_LEN + 10);
        let cut = excerpt(&long);
        assert_eq!(cut.chars().count(), RAW_EXCERPT_LEN + 1);
        assert!(cut.ends_with('…'));
    }
}
