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

const PROVIDER: &str = "Anthropic Claude";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 4096;
pub const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";

/// Structured output is obtained by forcing a single tool call whose input
/// schema is the expected report schema.
#[derive(Debug, Clone)]
pub struct AnthropicLLMClient {
    api_key: String,
    base_url: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<Message>,
    tools: Vec<Tool>,
    tool_choice: ToolChoice,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: Vec<ContentBlock>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Image { source: ImageSource },
    Text { text: String },
}

#[derive(Debug, Serialize)]
struct ImageSource {
    #[serde(rename = "type")]
    kind: &'static str,
    media_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
struct Tool {
    name: &'static str,
    description: &'static str,
    input_schema: Value,
}

#[derive(Debug, Serialize)]
struct ToolChoice {
    #[serde(rename = "type")]
    kind: &'static str,
    name: &'static str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ResponseBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ResponseBlock {
    ToolUse { input: Value },
    Text { text: String },
    #[serde(other)]
    Other,
}

impl AnthropicLLMClient {
    pub fn new(api_key: String, client: Client) -> Self {
        Self::with_base_url(api_key, ANTHROPIC_BASE_URL, client)
    }

    pub fn with_base_url(api_key: String, base_url: impl Into<String>, client: Client) -> Self {
        let base_url: String = base_url.into();
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    async fn call_messages_api(&self, request: MessagesRequest) -> Result<MessagesResponse, CoreError> {
        let url = format!("{}/v1/messages", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER, e))?;

        let response = ensure_success(PROVIDER, response).await?;

        decode_body(PROVIDER, response).await
    }
}

fn build_request(request: &GenerationRequest) -> MessagesRequest {
    let mut content = Vec::with_capacity(2);
    if let Some(media) = &request.prompt.media {
        content.push(ContentBlock::Image {
            source: ImageSource {
                kind: "base64",
                media_type: media.mime_type.clone(),
                data: media.data.clone(),
            },
        });
    }
    content.push(ContentBlock::Text {
        text: request.prompt.text.clone(),
    });

    MessagesRequest {
        model: request.model.clone(),
        max_tokens: MAX_TOKENS,
        messages: vec![Message {
            role: "user",
            content,
        }],
        tools: vec![Tool {
            name: request.schema_name,
            description: "Record the structured answer.",
            input_schema: request.response_schema.clone(),
        }],
        tool_choice: ToolChoice {
            kind: "tool",
            name: request.schema_name,
        },
    }
}

fn extract_output(response: MessagesResponse) -> Result<Option<Value>, CoreError> {
    let mut text = String::new();
    for block in response.content {
        match block {
            ResponseBlock::ToolUse { input } => return Ok(Some(input)),
            ResponseBlock::Text { text: part } => text.push_str(&part),
            ResponseBlock::Other => {}
        }
    }
    parse_json_text("content", &text)
}

impl LLMClient for AnthropicLLMClient {
    #[tracing::instrument(skip(self, request), fields(model = %request.model))]
    async fn generate(&self, request: GenerationRequest) -> Result<Option<Value>, CoreError> {
        let response = self.call_messages_api(build_request(&request)).await?;
        extract_output(response)
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

    #[test]
    fn test_request_forces_tool_call() {
        let request = GenerationRequest {
            provider: ProviderId::HostedC,
            model: "claude-3-5-sonnet-latest".to_string(),
            prompt: PromptData {
                text: "Analyze the product".to_string(),
                media: Some(MediaPart {
                    mime_type: "image/webp".to_string(),
                    data: "UklGRg==".to_string(),
                }),
            },
            response_schema: json!({ "type": "object" }),
            schema_name: "health_report",
        };

        let body = serde_json::to_value(build_request(&request)).unwrap();

        assert_eq!(body["tool_choice"], json!({ "type": "tool", "name": "health_report" }));
        assert_eq!(body["tools"][0]["input_schema"], json!({ "type": "object" }));
        assert_eq!(
            body["messages"][0]["content"][0],
            json!({ "type": "image", "source": { "type": "base64", "media_type": "image/webp", "data": "UklGRg==" } })
        );
        assert_eq!(body["messages"][0]["content"][1]["type"], "text");
    }

    #[test]
    fn test_tool_input_is_the_output() {
        let response: MessagesResponse = serde_json::from_value(json!({
            "content": [
                { "type": "text", "text": "Recording the report." },
                { "type": "tool_use", "id": "toolu_1", "name": "health_report", "input": { "summary": "x" } }
            ]
        }))
        .unwrap();
        assert_eq!(extract_output(response).unwrap(), Some(json!({ "summary": "x" })));
    }

    #[test]
    fn test_text_only_reply_is_parsed() {
        let response: MessagesResponse = serde_json::from_value(json!({
            "content": [{ "type": "text", "text": "{\"results\": [\"Oreo\"]}" }]
        }))
        .unwrap();
        assert_eq!(extract_output(response).unwrap(), Some(json!({ "results": ["Oreo"] })));
    }

    #[test]
    fn test_empty_reply_is_no_output() {
        let response: MessagesResponse = serde_json::from_value(json!({ "content": [] })).unwrap();
        assert_eq!(extract_output(response).unwrap(), None);
    }
}
