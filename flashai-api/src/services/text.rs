//! Text tools: grammar check, rewriting, humanizing, AI-probability scoring,
//! tutor chat and local complexity analysis

use flashai_common::api::{ComplexityLevel, GrammarCheckResponse, TextComplexity};
use flashai_common::ChatMessage;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use super::flashcards::string_field;
use super::{summarize, validators};
use crate::error::{ServiceError, ServiceResult};
use crate::llm::prompts::{self, TextPrompt};
use crate::llm::{json_type_name, CompletionOptions, ModelClient};

/// Reading speed used for `readingTimeMinutes`
const WORDS_PER_MINUTE: f64 = 200.0;

/// Model-backed text operations
#[derive(Clone)]
pub struct TextService {
    model: Arc<dyn ModelClient>,
}

impl TextService {
    pub fn new(model: Arc<dyn ModelClient>) -> Self {
        Self { model }
    }

    pub async fn check_grammar(&self, text: &str) -> ServiceResult<GrammarCheckResponse> {
        let text = validators::validate_text(text, "text", validators::MAX_TEXT_LENGTH)?;
        info!(operation = "grammar_check", text = %summarize(&text), "Checking grammar");

        let prompt = prompts::grammar_prompt(&text);
        let args = self
            .model
            .complete_structured(&prompt.system, &prompt.user, &prompt.schema)
            .await?;

        let corrected_text = string_field(&args, "correctedText")?.to_string();
        let errors = match args.get("errors") {
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s.clone()),
                    other => Err(ServiceError::SchemaViolation(format!(
                        "errors must contain strings, got {}",
                        json_type_name(other)
                    ))),
                })
                .collect::<ServiceResult<Vec<_>>>()?,
            Some(other) => {
                return Err(ServiceError::SchemaViolation(format!(
                    "errors must be an array, got {}",
                    json_type_name(other)
                )))
            }
            None => Vec::new(),
        };

        info!(operation = "grammar_check", error_count = errors.len(), "Grammar check completed");
        Ok(GrammarCheckResponse {
            corrected_text,
            errors,
        })
    }

    pub async fn enhance(&self, text: &str, task: &str) -> ServiceResult<String> {
        let text = validators::validate_text(text, "text", validators::MAX_TEXT_LENGTH)?;
        let task = validators::validate_task(task)?;
        info!(operation = "enhance_text", task = task.as_str(), text = %summarize(&text), "Enhancing text");

        self.complete("enhance_text", prompts::enhance_prompt(&text, task)).await
    }

    pub async fn humanize(&self, text: &str) -> ServiceResult<String> {
        let text = validators::validate_text(text, "text", validators::MAX_TEXT_LENGTH)?;
        info!(operation = "humanize_text", text = %summarize(&text), "Humanizing text");

        self.complete("humanize_text", prompts::humanize_prompt(&text)).await
    }

    /// Score 0..=100 parsed from the model's free-text reply
    pub async fn ai_probability(&self, text: &str) -> ServiceResult<u8> {
        let text = validators::validate_text(text, "text", validators::MAX_TEXT_LENGTH)?;
        info!(operation = "ai_probability", text = %summarize(&text), "Scoring AI probability");

        let prompt = prompts::ai_detection_prompt(&text);
        let options = CompletionOptions {
            temperature: Some(0.1),
            max_tokens: Some(50),
        };
        let reply = self
            .model
            .complete_text(&prompt.system, &[ChatMessage::user(prompt.user)], &options)
            .await?;

        let probability = parse_probability(&reply)?;
        info!(operation = "ai_probability", probability, "AI probability scored");
        Ok(probability)
    }

    pub async fn chat(&self, messages: &[ChatMessage]) -> ServiceResult<String> {
        let messages = validators::validate_chat_messages(messages)?;
        let started = Instant::now();
        info!(operation = "chat", message_count = messages.len(), "Forwarding chat");

        let reply = self
            .model
            .complete_text(prompts::chat_system_prompt(), &messages, &CompletionOptions::default())
            .await?;

        info!(
            operation = "chat",
            elapsed_ms = started.elapsed().as_millis(),
            "Chat reply received"
        );
        Ok(reply.trim().to_string())
    }

    async fn complete(&self, operation: &'static str, prompt: TextPrompt) -> ServiceResult<String> {
        let started = Instant::now();
        let reply = self
            .model
            .complete_text(&prompt.system, &[ChatMessage::user(prompt.user)], &CompletionOptions::default())
            .await?;

        info!(operation, elapsed_ms = started.elapsed().as_millis(), "Text completed");
        Ok(reply.trim().to_string())
    }
}

/// First run of ASCII digits, clamped to 100
pub fn parse_probability(reply: &str) -> ServiceResult<u8> {
    let digits: String = reply
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();

    if digits.is_empty() {
        return Err(ServiceError::ParseError(format!(
            "No probability found in reply: {}",
            summarize(reply)
        )));
    }

    // All-digit strings only fail to parse on overflow
    let value = digits.parse::<u64>().unwrap_or(u64::MAX);
    Ok(value.min(100) as u8)
}

/// Local readability metrics; no model call
pub fn analyze_complexity(text: &str) -> ServiceResult<TextComplexity> {
    let text = validators::validate_text(text, "text", validators::MAX_ANALYSIS_TEXT_LENGTH)?;

    let words: Vec<&str> = text.split_whitespace().collect();
    let word_count = words.len();
    let sentence_count = text.chars().filter(|c| matches!(c, '.' | '!' | '?')).count().max(1);

    let average_word_length = if word_count > 0 {
        let letters: usize = words
            .iter()
            .map(|w| w.trim_matches(|c| ".,!?;:".contains(c)).chars().count())
            .sum();
        letters as f64 / word_count as f64
    } else {
        0.0
    };
    let average_sentence_length = word_count as f64 / sentence_count as f64;

    let (complexity_level, difficulty_score) =
        if average_word_length < 4.0 && average_sentence_length < 10.0 {
            (ComplexityLevel::Beginner, 1)
        } else if average_word_length < 6.0 && average_sentence_length < 15.0 {
            (ComplexityLevel::Intermediate, 2)
        } else {
            (ComplexityLevel::Advanced, 3)
        };

    Ok(TextComplexity {
        word_count,
        sentence_count,
        average_word_length: round1(average_word_length),
        average_sentence_length: round1(average_sentence_length),
        complexity_level,
        difficulty_score,
        reading_time_minutes: round1(word_count as f64 / WORDS_PER_MINUTE),
    })
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
