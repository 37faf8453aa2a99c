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

const PROVIDER: &str = "OpenAI";
pub const OPENAI_BASE_URL: &str = "https://api.openai.com";

#[derive(Debug, Clone)]
pub struct OpenAILLMClient {
    api_key: String,
    base_url: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: Vec<ContentPart>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
    json_schema: JsonSchema,
}

#[derive(Debug, Serialize)]
struct JsonSchema {
    name: &'static str,
    schema: Value,
    strict: bool,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
    refusal: Option<String>,
}

impl OpenAILLMClient {
    pub fn new(api_key: String, client: Client) -> Self {
        Self::with_base_url(api_key, OPENAI_BASE_URL, client)
    }

    pub fn with_base_url(api_key: String, base_url: impl Into<String>, client: Client) -> Self {
        let base_url: String = base_url.into();
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    async fn call_chat_api(&self, request: ChatRequest) -> Result<ChatResponse, CoreError> {
        let url = format!("{}/v1/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER, e))?;

        let response = ensure_success(PROVIDER, response).await?;

        decode_body(PROVIDER, response).await
    }
}

fn build_request(request: &GenerationRequest) -> ChatRequest {
    let mut content = vec![ContentPart::Text {
        text: request.prompt.text.clone(),
    }];
    if let Some(media) = &request.prompt.media {
        content.push(ContentPart::ImageUrl {
            image_url: ImageUrl {
                url: media.to_data_uri(),
            },
        });
    }

    ChatRequest {
        model: request.model.clone(),
        messages: vec![ChatMessage {
            role: "user",
            content,
        }],
        response_format: ResponseFormat {
            kind: "json_schema",
            json_schema: JsonSchema {
                name: request.schema_name,
                schema: request.response_schema.clone(),
                strict: false,
            },
        },
    }
}

impl LLMClient for OpenAILLMClient {
    #[tracing::instrument(skip(self, request), fields(model = %request.model))]
    async fn generate(&self, request: GenerationRequest) -> Result<Option<Value>, CoreError> {
        let response = self.call_chat_api(build_request(&request)).await?;

        let Some(message) = response.choices.into_iter().next().map(|c| c.message) else {
            tracing::warn!("OpenAI returned no choices");
            return Ok(None);
        };
        if let Some(refusal) = message.refusal {
            tracing::warn!(refusal = %refusal, "OpenAI refused the request");
        }

        match message.content {
            Some(text) => parse_json_text("choices[0].message.content", &text),
            None => Ok(None),
        }
    }
}
