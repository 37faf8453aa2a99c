use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use crate::{
    domain::{
        common::entities::app_errors::CoreError,
        health_report::{ports::LLMClient, value_objects::GenerationRequest},
    },
    infrastructure::llm::{decode_body, ensure_success, excerpt, parse_json_text, transport_error},
};

const PROVIDER: &str = "Ollama";

/// Adapter for a locally running Ollama server.
#[derive(Debug, Clone)]
pub struct OllamaLLMClient {
    base_url: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    format: &'a str,
}

impl OllamaLLMClient {
    pub fn new(base_url: impl Into<String>, client: Client) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn call_generate_api(&self, model: &str, prompt: &str) -> Result<Value, CoreError> {
        let url = format!("{}/api/generate", self.base_url);
        let body = OllamaRequest {
            model,
            prompt,
            stream: false,
            format: "json",
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER, e))?;

        let response = ensure_success(PROVIDER, response).await?;

        decode_body(PROVIDER, response).await
    }
}

impl LLMClient for OllamaLLMClient {
    #[tracing::instrument(skip(self, request), fields(model = %request.model))]
    async fn generate(&self, request: GenerationRequest) -> Result<Option<Value>, CoreError> {
        let envelope = self
            .call_generate_api(&request.model, &request.prompt.text)
            .await?;

        extract_envelope(envelope)
    }
}

/// Pulls the model output out of the runtime's envelope. Three shapes are
/// accepted: `response` holding JSON text, `response` holding an already
/// parsed object, and chat-style `message.content` holding JSON text.
pub fn extract_envelope(envelope: Value) -> Result<Option<Value>, CoreError> {
    match envelope.get("response") {
        Some(Value::String(text)) => return parse_json_text("response", text),
        Some(value @ Value::Object(_)) => return Ok(Some(value.clone())),
        _ => {}
    }

    if let Some(Value::String(text)) = envelope.pointer("/message/content") {
        return parse_json_text("message.content", text);
    }

    tracing::error!(envelope = %excerpt(&envelope.to_string()), "Unrecognized Ollama envelope");
    Err(CoreError::UnrecognizedEnvelope(excerpt(&envelope.to_string())))
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
    };

    use super::*;
    use crate::domain::{health_report::value_objects::PromptData, provider::entities::ProviderId};

    fn expected() -> Value {
        json!({ "summary": "Plain oats.", "ingredients": [{ "name": "Oats" }] })
    }

    #[test]
    fn test_response_string_envelope() {
        let envelope = json!({ "response": expected().to_string(), "done": true });
        assert_eq!(extract_envelope(envelope).unwrap(), Some(expected()));
    }

    #[test]
    fn test_response_object_envelope() {
        let envelope = json!({ "response": expected() });
        assert_eq!(extract_envelope(envelope).unwrap(), Some(expected()));
    }

    #[test]
    fn test_message_content_envelope() {
        let envelope = json!({ "message": { "role": "assistant", "content": expected().to_string() } });
        assert_eq!(extract_envelope(envelope).unwrap(), Some(expected()));
    }

    #[test]
    fn test_empty_ingredients_still_parse() {
        let envelope = json!({ "response": "{\"summary\":\"x\",\"ingredients\":[]}" });
        assert_eq!(
            extract_envelope(envelope).unwrap(),
            Some(json!({ "summary": "x", "ingredients": [] }))
        );
    }

    #[test]
    fn test_empty_response_is_no_output() {
        let envelope = json!({ "response": "" });
        assert_eq!(extract_envelope(envelope).unwrap(), None);
    }

    #[test]
    fn test_unknown_envelope_keeps_raw_payload() {
        let envelope = json!({ "output": "something" });
        let error = extract_envelope(envelope).unwrap_err();
        assert_eq!(
            error,
            CoreError::UnrecognizedEnvelope(r#"{"output":"something"}"#.to_string())
        );
    }

    #[test]
    fn test_invalid_inner_json_is_a_parse_error() {
        let envelope = json!({ "response": "I cannot help with that." });
        let error = extract_envelope(envelope).unwrap_err();
        assert!(error.is_parse());
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let client = OllamaLLMClient::new("http://localhost:11434/", Client::new());
        assert_eq!(client.base_url(), "http://localhost:11434");
    }

    /// Answers a single HTTP request with the given status line and body.
    async fn serve_once(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            read_request(&mut socket).await;
            let reply = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(reply.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });

        format!("http://{address}")
    }

    /// Drains headers and body so closing the socket does not reset it.
    async fn read_request(socket: &mut tokio::net::TcpStream) {
        let mut received = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                return;
            }
            received.extend_from_slice(&chunk[..n]);

            let text = String::from_utf8_lossy(&received);
            let Some(header_end) = text.find("\r\n\r\n") else {
                continue;
            };
            let content_length = text[..header_end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if received.len() >= header_end + 4 + content_length {
                return;
            }
        }
    }

    fn generation_request() -> GenerationRequest {
        GenerationRequest {
            provider: ProviderId::Local,
            model: "llama3.1".to_string(),
            prompt: PromptData {
                text: "Analyze Maggi Noodles".to_string(),
                media: None,
            },
            response_schema: json!({}),
            schema_name: "health_report",
        }
    }

    #[tokio::test]
    async fn test_generate_parses_runtime_reply() {
        let base_url = serve_once("200 OK", r#"{"model":"llama3.1","response":"{\"summary\":\"x\"}","done":true}"#).await;
        let client = OllamaLLMClient::new(base_url, Client::new());

        let output = client.generate(generation_request()).await.unwrap();

        assert_eq!(output, Some(json!({ "summary": "x" })));
    }

    #[tokio::test]
    async fn test_generate_reports_error_status() {
        let base_url = serve_once("404 Not Found", r#"{"error":"model 'llama3.1' not found"}"#).await;
        let client = OllamaLLMClient::new(base_url, Client::new());

        let error = client.generate(generation_request()).await.unwrap_err();

        match error {
            CoreError::UnexpectedStatus { status, body, .. } => {
                assert_eq!(status, 404);
                assert!(body.contains("not found"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_generate_quotes_undecodable_body() {
        let base_url = serve_once("200 OK", "upstream proxy error").await;
        let client = OllamaLLMClient::new(base_url, Client::new());

        let error = client.generate(generation_request()).await.unwrap_err();

        match error {
            CoreError::ParseError { raw, .. } => assert_eq!(raw, "upstream proxy error"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
