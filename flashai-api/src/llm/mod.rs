// External Model Client
//
// Chat-completion provider behind a trait seam so orchestration can be
// exercised against a stub. Two call shapes: free text and structured
// (forced function call with JSON arguments).

use async_trait::async_trait;
use flashai_common::ChatMessage;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

pub mod openai;
pub mod prompts;
pub mod retry;

pub use openai::{ClientSettings, OpenAiClient};
pub use retry::RetryPolicy;

/// JSON object returned by a structured completion
pub type FunctionArgs = Map<String, Value>;

/// Model client errors surfaced to callers after retries are settled
#[derive(Debug, Error)]
pub enum ModelError {
    /// Transport failure, timeout, 429 or 5xx on every attempt
    #[error("Model provider unavailable after {attempts} attempt(s): {last_error}")]
    Unavailable { attempts: u32, last_error: String },

    /// Provider refused the request (4xx other than 429); not retried
    #[error("Model provider rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// Provider replied, but not in the agreed shape; not retried
    #[error("Model response violated schema: {0}")]
    SchemaViolation(String),
}

/// Per-call overrides of the configured sampling parameters
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CompletionOptions {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

/// A single function the model is forced to call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionSchema {
    pub name: String,
    pub description: String,
    /// JSON-schema object describing the arguments
    pub parameters: Value,
}

impl FunctionSchema {
    pub fn new(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }

    /// Names listed under `parameters.required`
    pub fn required_fields(&self) -> Vec<&str> {
        self.parameters
            .get("required")
            .and_then(Value::as_array)
            .map(|fields| fields.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// Parse raw function-call arguments and check required keys are present
    pub fn parse_arguments(&self, raw: &str) -> Result<FunctionArgs, ModelError> {
        let value: Value = serde_json::from_str(raw).map_err(|e| {
            ModelError::SchemaViolation(format!("{} arguments are not valid JSON: {}", self.name, e))
        })?;

        let args = match value {
            Value::Object(map) => map,
            other => {
                return Err(ModelError::SchemaViolation(format!(
                    "{} arguments must be an object, got {}",
                    self.name,
                    json_type_name(&other)
                )))
            }
        };

        let missing: Vec<&str> = self
            .required_fields()
            .into_iter()
            .filter(|field| args.get(*field).map_or(true, Value::is_null))
            .collect();
        if !missing.is_empty() {
            return Err(ModelError::SchemaViolation(format!(
                "{} arguments missing required field(s): {}",
                self.name,
                missing.join(", ")
            )));
        }

        Ok(args)
    }
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Chat-completion provider
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Free-text completion. `system_prompt` is sent ahead of `messages`.
    async fn complete_text(
        &self,
        system_prompt: &str,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> Result<String, ModelError>;

    /// Force a call to `schema` and return its parsed, key-checked arguments
    async fn complete_structured(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        schema: &FunctionSchema,
    ) -> Result<FunctionArgs, ModelError>;
}
