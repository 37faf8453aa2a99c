use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    domain::{
        common::entities::app_errors::CoreError,
        health_report::{ports::LLMClient, value_objects::GenerationRequest},
    },
    infrastructure::llm::{decode_body, ensure_success, parse_json_text, transport_error},
};

const PROVIDER: &str = "Google Gemini";
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Debug, Clone)]
pub struct GeminiLLMClient {
    api_key: String,
    base_url: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Debug, Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    response_mime_type: String,
    response_schema: Value,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Debug, Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Debug, Deserialize)]
struct PartResponse {
    #[serde(default)]
    text: String,
}

impl GeminiLLMClient {
    pub fn new(api_key: String, client: Client) -> Self {
        Self::with_base_url(api_key, GEMINI_BASE_URL, client)
    }

    pub fn with_base_url(api_key: String, base_url: impl Into<String>, client: Client) -> Self {
        let base_url: String = base_url.into();
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    async fn call_gemini_api(&self, model: &str, request: GeminiRequest) -> Result<GeminiResponse, CoreError> {
        let url = format!("{}/v1beta/models/{}:generateContent", self.base_url, model);

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER, e))?;

        let response = ensure_success(PROVIDER, response).await?;

        decode_body(PROVIDER, response).await
    }
}

fn build_request(request: &GenerationRequest) -> GeminiRequest {
    let mut parts = vec![Part::Text {
        text: request.prompt.text.clone(),
    }];
    if let Some(media) = &request.prompt.media {
        parts.push(Part::InlineData {
            inline_data: InlineData {
                mime_type: media.mime_type.clone(),
                data: media.data.clone(),
            },
        });
    }

    GeminiRequest {
        contents: vec![Content { parts }],
        generation_config: Some(GenerationConfig {
            response_mime_type: "application/json".to_string(),
            response_schema: request.response_schema.clone(),
        }),
    }
}

/// Concatenated text of the first candidate. `None` when the model returned
/// no candidate (for instance when the prompt was blocked).
fn candidate_text(response: &GeminiResponse) -> Option<String> {
    let content = response.candidates.first()?.content.as_ref()?;
    let text: String = content.parts.iter().map(|p| p.text.as_str()).collect();
    Some(text)
}

impl LLMClient for GeminiLLMClient {
    #[tracing::instrument(skip(self, request), fields(model = %request.model))]
    async fn generate(&self, request: GenerationRequest) -> Result<Option<Value>, CoreError> {
        let body = build_request(&request);
        let response = self.call_gemini_api(&request.model, body).await?;

        match candidate_text(&response) {
            Some(text) => parse_json_text("candidates[0].content", &text),
            None => {
                tracing::warn!("Gemini returned no candidates");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::{
        health_report::value_objects::{MediaPart, PromptData},
        provider::entities::ProviderId,
    };

    fn request(media: Option<MediaPart>) -> GenerationRequest {
        GenerationRequest {
            provider: ProviderId::HostedA,
            model: "gemini-1.5-flash".to_string(),
            prompt: PromptData {
                text: "Analyze the product".to_string(),
                media,
            },
            response_schema: json!({ "type": "object" }),
            schema_name: "health_report",
        }
    }

    #[test]
    fn test_request_declares_schema_and_mime_type() {
        let body = serde_json::to_value(build_request(&request(None))).unwrap();
        assert_eq!(
            body,
            json!({
                "contents": [{ "parts": [{ "text": "Analyze the product" }] }],
                "generation_config": {
                    "response_mime_type": "application/json",
                    "response_schema": { "type": "object" }
                }
            })
        );
    }

    #[test]
    fn test_request_inlines_image() {
        let media = MediaPart {
            mime_type: "image/jpeg".to_string(),
            data: "/9j/4AAQ".to_string(),
        };
        let body = serde_json::to_value(build_request(&request(Some(media)))).unwrap();
        assert_eq!(
            body["contents"][0]["parts"][1],
            json!({ "inline_data": { "mime_type": "image/jpeg", "data": "/9j/4AAQ" } })
        );
    }

    #[test]
    fn test_candidate_text_joins_parts() {
        let response: GeminiResponse = serde_json::from_value(json!({
            "candidates": [{ "content": { "parts": [{ "text": "{\"summary\":" }, { "text": "\"x\"}" }] } }]
        }))
        .unwrap();
        assert_eq!(candidate_text(&response).as_deref(), Some("{\"summary\":\"x\"}"));
    }

    #[test]
    fn test_blocked_prompt_has_no_candidate() {
        let response: GeminiResponse =
            serde_json::from_value(json!({ "promptFeedback": { "blockReason": "SAFETY" } })).unwrap();
        assert_eq!(candidate_text(&response), None);
    }
}
