//! OpenAI-compatible chat-completion client
//!
//! `POST {base_url}/v1/chat/completions` with bearer auth. Structured calls
//! declare exactly one function and force the model to call it.

use super::retry::{retry_with_backoff, AttemptError, RetryPolicy};
use super::{CompletionOptions, FunctionArgs, FunctionSchema, ModelClient, ModelError};
use async_trait::async_trait;
use flashai_common::config::AppConfig;
use flashai_common::{ChatMessage, Error, Result};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

const COMPLETIONS_PATH: &str = "/v1/chat/completions";
const USER_AGENT: &str = concat!("FlashAI/", env!("CARGO_PKG_VERSION"));

/// Connection and sampling settings for [`OpenAiClient`]
#[derive(Clone)]
pub struct ClientSettings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl From<&AppConfig> for ClientSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            base_url: config.api_base_url.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            timeout: config.request_timeout,
            retry: RetryPolicy {
                max_attempts: config.max_attempts,
                base_delay: config.retry_base_delay,
                max_delay: config.retry_max_delay,
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    functions: Option<[&'a FunctionSchema; 1]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    function_call: Option<ForcedCall<'a>>,
}

#[derive(Debug, Serialize)]
struct ForcedCall<'a> {
    name: &'a str,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
    function_call: Option<FunctionCall>,
}

#[derive(Debug, Deserialize)]
struct FunctionCall {
    name: Option<String>,
    arguments: String,
}

/// Chat-completion client with timeout and retry
pub struct OpenAiClient {
    http_client: reqwest::Client,
    settings: ClientSettings,
    endpoint: String,
}

impl OpenAiClient {
    pub fn new(settings: ClientSettings) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(settings.timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        let endpoint = format!("{}{}", settings.base_url.trim_end_matches('/'), COMPLETIONS_PATH);

        Ok(Self {
            http_client,
            settings,
            endpoint,
        })
    }

    pub fn model(&self) -> &str {
        &self.settings.model
    }

    /// One HTTP round trip, classified for the retry loop
    async fn send_once(&self, request: &CompletionRequest<'_>) -> std::result::Result<CompletionResponse, AttemptError> {
        let started = Instant::now();
        let response = self
            .http_client
            .post(&self.endpoint)
            .bearer_auth(&self.settings.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AttemptError::Transient(format!(
                        "Request timed out after {} s",
                        self.settings.timeout.as_secs()
                    ))
                } else {
                    AttemptError::Transient(format!("Network error: {}", e))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AttemptError::Transient(format!("Failed to read response body: {}", e)))?;

        tracing::debug!(
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis(),
            "Model provider responded"
        );

        if !status.is_success() {
            let message = describe_error(status.as_u16(), &body);
            return Err(if is_transient_status(status.as_u16()) {
                AttemptError::Transient(message)
            } else {
                AttemptError::Rejected {
                    status: status.as_u16(),
                    message,
                }
            });
        }

        serde_json::from_str(&body)
            .map_err(|e| AttemptError::Schema(format!("Unexpected completion payload: {}", e)))
    }

    fn request<'a>(
        &'a self,
        messages: &'a [ChatMessage],
        options: &CompletionOptions,
    ) -> CompletionRequest<'a> {
        CompletionRequest {
            model: &self.settings.model,
            messages,
            temperature: options.temperature.unwrap_or(self.settings.temperature),
            max_tokens: options.max_tokens.unwrap_or(self.settings.max_tokens),
            functions: None,
            function_call: None,
        }
    }
}

#[async_trait]
impl ModelClient for OpenAiClient {
    async fn complete_text(
        &self,
        system_prompt: &str,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> std::result::Result<String, ModelError> {
        let mut conversation = Vec::with_capacity(messages.len() + 1);
        conversation.push(ChatMessage::system(system_prompt));
        conversation.extend_from_slice(messages);

        let request = self.request(&conversation, options);

        retry_with_backoff("complete_text", &self.settings.retry, || async {
            let response = self.send_once(&request).await?;
            extract_text(response)
        })
        .await
    }

    async fn complete_structured(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        schema: &FunctionSchema,
    ) -> std::result::Result<FunctionArgs, ModelError> {
        let conversation = [ChatMessage::system(system_prompt), ChatMessage::user(user_prompt)];

        let mut request = self.request(&conversation, &CompletionOptions::default());
        request.functions = Some([schema]);
        request.function_call = Some(ForcedCall { name: &schema.name });

        retry_with_backoff(&schema.name, &self.settings.retry, || async {
            let response = self.send_once(&request).await?;
            extract_arguments(response, schema)
        })
        .await
    }
}

fn first_message(response: CompletionResponse) -> std::result::Result<ResponseMessage, AttemptError> {
    response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message)
        .ok_or_else(|| AttemptError::Schema("Completion contained no choices".to_string()))
}

fn extract_text(response: CompletionResponse) -> std::result::Result<String, AttemptError> {
    first_message(response)?
        .content
        .filter(|content| !content.trim().is_empty())
        .ok_or_else(|| AttemptError::Schema("Completion contained no text content".to_string()))
}

fn extract_arguments(
    response: CompletionResponse,
    schema: &FunctionSchema,
) -> std::result::Result<FunctionArgs, AttemptError> {
    let call = first_message(response)?.function_call.ok_or_else(|| {
        AttemptError::Schema(format!("Model did not call function {}", schema.name))
    })?;

    if let Some(name) = call.name.as_deref() {
        if name != schema.name {
            return Err(AttemptError::Schema(format!(
                "Model called {} instead of {}",
                name, schema.name
            )));
        }
    }

    schema.parse_arguments(&call.arguments).map_err(|e| match e {
        ModelError::SchemaViolation(message) => AttemptError::Schema(message),
        other => AttemptError::Schema(other.to_string()),
    })
}

/// 429 and 5xx are worth another attempt
fn is_transient_status(status: u16) -> bool {
    status == 429 || (500..600).contains(&status)
}

/// Human-readable summary of a provider error response
fn describe_error(status: u16, body: &str) -> String {
    let base = match status {
        400 => "Bad request - invalid parameters".to_string(),
        401 => "Authentication failed - check API key".to_string(),
        403 => "Access forbidden - insufficient permissions".to_string(),
        404 => "Endpoint or model not found".to_string(),
        429 => "Rate limit exceeded - too many requests".to_string(),
        500 => "Provider internal error".to_string(),
        502 => "Bad gateway - provider temporarily unavailable".to_string(),
        503 => "Provider unavailable".to_string(),
        other => format!("Provider error (status {})", other),
    };

    let provider_message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.pointer("/error/message")?.as_str().map(str::to_string));

    match provider_message {
        Some(detail) => format!("{}: {}", base, detail),
        None if body.trim().is_empty() => base,
        None => format!("{}: {}", base, truncate(body.trim(), 200)),
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(value: serde_json::Value) -> CompletionResponse {
        serde_json::from_value(value).unwrap()
    }

    fn schema() -> FunctionSchema {
        FunctionSchema::new(
            "create_flashcard",
            "demo",
            json!({"type": "object", "required": ["word"]}),
        )
    }

    #[test]
    fn test_transient_status_classification() {
        assert!(is_transient_status(429));
        assert!(is_transient_status(500));
        assert!(is_transient_status(503));
        assert!(!is_transient_status(400));
        assert!(!is_transient_status(401));
        assert!(!is_transient_status(404));
    }

    #[test]
    fn test_describe_error_uses_provider_message() {
        let body = r#"{"error":{"message":"Incorrect API key provided","type":"invalid_request_error"}}"#;
        assert_eq!(
            describe_error(401, body),
            "Authentication failed - check API key: Incorrect API key provided"
        );
    }

    #[test]
    fn test_describe_error_truncates_raw_body() {
        let body = "x".repeat(500);
        let message = describe_error(418, &body);
        assert!(message.starts_with("Provider error (status 418): "));
        assert!(message.ends_with("..."));
        assert!(message.len() < 260);
    }

    #[test]
    fn test_extract_text() {
        let r = response(json!({"choices": [{"message": {"content": "Hello"}}]}));
        assert_eq!(extract_text(r).unwrap(), "Hello");

        let empty = response(json!({"choices": []}));
        assert!(matches!(extract_text(empty), Err(AttemptError::Schema(_))));

        let null = response(json!({"choices": [{"message": {"content": null}}]}));
        assert!(matches!(extract_text(null), Err(AttemptError::Schema(_))));
    }

    #[test]
    fn test_extract_arguments() {
        let r = response(json!({"choices": [{"message": {
            "content": null,
            "function_call": {"name": "create_flashcard", "arguments": "{\"word\":\"apple\"}"}
        }}]}));
        let args = extract_arguments(r, &schema()).unwrap();
        assert_eq!(args["word"], "apple");
    }

    #[test]
    fn test_extract_arguments_wrong_function() {
        let r = response(json!({"choices": [{"message": {
            "function_call": {"name": "grammar_check", "arguments": "{}"}
        }}]}));
        assert!(matches!(extract_arguments(r, &schema()), Err(AttemptError::Schema(_))));
    }

    #[test]
    fn test_extract_arguments_without_call() {
        let r = response(json!({"choices": [{"message": {"content": "plain text"}}]}));
        assert!(matches!(extract_arguments(r, &schema()), Err(AttemptError::Schema(_))));
    }

    #[test]
    fn test_structured_request_shape() {
        let settings = ClientSettings {
            api_key: "sk-test".into(),
            base_url: "http://localhost:9/".into(),
            model: "test-model".into(),
            temperature: 0.7,
            max_tokens: 1000,
            timeout: Duration::from_secs(1),
            retry: RetryPolicy::default(),
        };
        let client = OpenAiClient::new(settings).unwrap();
        assert_eq!(client.endpoint, "http://localhost:9/v1/chat/completions");

        let schema = schema();
        let messages = [ChatMessage::user("hi")];
        let mut request = client.request(&messages, &CompletionOptions::default());
        request.functions = Some([&schema]);
        request.function_call = Some(ForcedCall { name: &schema.name });

        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["model"], "test-model");
        assert_eq!(body["max_tokens"], 1000);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["functions"][0]["name"], "create_flashcard");
        assert_eq!(body["function_call"]["name"], "create_flashcard");
    }

    #[test]
    fn test_text_request_omits_functions() {
        let settings = ClientSettings {
            api_key: "sk-test".into(),
            base_url: "http://localhost:9".into(),
            model: "m".into(),
            temperature: 0.7,
            max_tokens: 1000,
            timeout: Duration::from_secs(1),
            retry: RetryPolicy::default(),
        };
        let client = OpenAiClient::new(settings).unwrap();
        let messages = [ChatMessage::user("hi")];
        let options = CompletionOptions {
            temperature: Some(0.2),
            max_tokens: Some(10),
        };

        let body = serde_json::to_value(client.request(&messages, &options)).unwrap();
        assert!(body.get("functions").is_none());
        assert!(body.get("function_call").is_none());
        assert_eq!(body["max_tokens"], 10);
    }
}
