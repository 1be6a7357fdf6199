use crate::error::AppError;
use crate::llm::traits::{CompletionRequest, LlmClient};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::time::timeout;
use tracing::{debug, warn};
use url::Url;

/// HTTP client for an OpenAI-compatible `chat/completions` endpoint.
///
/// Cheap to clone; the underlying connection pool is shared.
#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl OpenAiClient {
    /// # Arguments
    ///
    /// * `base_url` - API root such as `https://api.openai.com/v1`.
    /// * `model` - Model identifier sent with every request.
    /// * `api_key` - Bearer token; requests are sent unauthenticated when absent.
    pub fn new(base_url: &Url, model: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: format!("{}/chat/completions", base_url.as_str().trim_end_matches('/')),
            model: model.into(),
            api_key,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn headers(&self) -> Result<HeaderMap, AppError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(key) = &self.api_key {
            let value = HeaderValue::from_str(&format!("Bearer {}", key))
                .map_err(|e| AppError::Config(format!("Invalid API key header: {}", e)))?;
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }

    async fn send(&self, body: &ChatRequest<'_>) -> Result<String, AppError> {
        let response = self
            .client
            .post(&self.endpoint)
            .headers(self.headers()?)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!("Completion request rejected with status {}", status);
            return Err(AppError::UpstreamTransport(format!(
                "Completion request failed with status {}: {}",
                status, text
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| AppError::UpstreamFormat(format!("Unreadable completion body: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AppError::UpstreamFormat("Completion has no message content".to_string()))
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String, AppError> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = request.system.as_deref() {
            messages.push(ChatMessage { role: "system", content: system });
        }
        messages.push(ChatMessage { role: "user", content: &request.user });

        let body = ChatRequest {
            model: &self.model,
            temperature: request.temperature,
            messages,
            response_format: request.json_mode.then_some(ResponseFormat { kind: "json_object" }),
        };

        debug!(
            model = %self.model,
            json_mode = request.json_mode,
            timeout_ms = request.timeout.as_millis() as u64,
            "Sending completion request"
        );

        timeout(request.timeout, self.send(&body)).await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, api_key: Option<&str>) -> OpenAiClient {
        let base = Url::parse(&format!("{}/v1", server.uri())).unwrap();
        OpenAiClient::new(&base, "gpt-test", api_key.map(str::to_string))
    }

    fn completion(content: &str) -> serde_json::Value {
        json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "choices": [{ "index": 0, "message": { "role": "assistant", "content": content } }]
        })
    }

    #[tokio::test]
    async fn test_complete_returns_first_choice_content() {
        // 1. Arrange
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "model": "gpt-test",
                "response_format": { "type": "json_object" },
                "messages": [
                    { "role": "system", "content": "sys" },
                    { "role": "user", "content": "hello" }
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("{\"ok\":true}")))
            .mount(&mock_server)
            .await;
        let client = client_for(&mock_server, Some("sk-test"));

        // 2. Act
        let request = CompletionRequest::new("hello", Duration::from_secs(5))
            .with_system("sys")
            .json();
        let result = client.complete(request).await;

        // 3. Assert
        assert_eq!(result.unwrap(), "{\"ok\":true}");
    }

    #[tokio::test]
    async fn test_server_error_is_transport_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
            .mount(&mock_server)
            .await;
        let client = client_for(&mock_server, None);

        let result = client.complete(CompletionRequest::new("hello", Duration::from_secs(5))).await;

        match result {
            Err(AppError::UpstreamTransport(msg)) => {
                assert!(msg.contains("status 500"));
                assert!(msg.contains("Internal Server Error"));
            }
            other => panic!("Expected AppError::UpstreamTransport, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_slow_server_hits_call_timeout() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(completion("late"))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&mock_server)
            .await;
        let client = client_for(&mock_server, None);

        let result = client
            .complete(CompletionRequest::new("hello", Duration::from_millis(50)))
            .await;

        assert!(matches!(result, Err(AppError::UpstreamTimeout(_))));
    }

    #[tokio::test]
    async fn test_missing_choices_is_format_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
            .mount(&mock_server)
            .await;
        let client = client_for(&mock_server, None);

        let result = client.complete(CompletionRequest::new("hello", Duration::from_secs(5))).await;

        assert!(matches!(result, Err(AppError::UpstreamFormat(_))));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transport_error() {
        let base = Url::parse("http://127.0.0.1:9/v1").unwrap();
        let client = OpenAiClient::new(&base, "gpt-test", None);

        let result = client.complete(CompletionRequest::new("hello", Duration::from_secs(5))).await;

        assert!(matches!(
            result,
            Err(AppError::UpstreamTransport(_)) | Err(AppError::UpstreamTimeout(_))
        ));
    }
}
