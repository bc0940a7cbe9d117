//! Request input validation
//!
//! All checks run before any model call or store mutation. Each returns the
//! normalized value (trimmed, lower-cased where applicable).

use flashai_common::models::{FlashcardUpdate, MAX_WORD_LENGTH};
use flashai_common::{ChatMessage, ChatRole};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{ServiceError, ServiceResult};
use crate::llm::prompts::{EnhanceTask, TargetLanguage};

pub const MAX_TEXT_LENGTH: usize = 10_000;
pub const MAX_ANALYSIS_TEXT_LENGTH: usize = 5_000;
pub const MAX_CHAT_MESSAGES: usize = 50;
pub const MAX_CHAT_CONTENT_LENGTH: usize = 2_000;
pub const MAX_TRANSLATION_LENGTH: usize = 200;

static SUSPICIOUS_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)<script[^>]*>",
        r"(?i)javascript:",
        r"(?i)data:text/html",
        r"(?i)vbscript:",
        r"(?i)\bon\w+\s*=",
        r"(?i)eval\s*\(",
        r"(?i)exec\s*\(",
    ]
    .iter()
    .filter_map(|pattern| Regex::new(pattern).ok())
    .collect()
});

/// True if `text` looks like a script injection attempt
pub fn contains_suspicious_patterns(text: &str) -> bool {
    SUSPICIOUS_PATTERNS.iter().any(|re| re.is_match(text))
}

/// Trim and check length bounds (in characters) and content
pub fn validate_text(text: &str, field: &str, max_len: usize) -> ServiceResult<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::InvalidInput(format!("{} must not be empty", field)));
    }
    if trimmed.chars().count() > max_len {
        return Err(ServiceError::InvalidInput(format!(
            "{} must be no more than {} characters long",
            field, max_len
        )));
    }
    if contains_suspicious_patterns(trimmed) {
        return Err(ServiceError::InvalidInput(format!(
            "{} contains potentially unsafe content",
            field
        )));
    }
    Ok(trimmed.to_string())
}

pub fn validate_word(word: &str) -> ServiceResult<String> {
    validate_text(word, "word", MAX_WORD_LENGTH)
}

/// Missing means `auto`
pub fn validate_target_language(value: Option<&str>) -> ServiceResult<TargetLanguage> {
    match value {
        None => Ok(TargetLanguage::Auto),
        Some(raw) => TargetLanguage::parse(raw).ok_or_else(|| {
            ServiceError::InvalidInput(format!(
                "Language code '{}' is not supported. Allowed values: auto, en, english, vi, vietnamese",
                raw.trim().to_lowercase()
            ))
        }),
    }
}

pub fn validate_task(task: &str) -> ServiceResult<EnhanceTask> {
    EnhanceTask::parse(task).ok_or_else(|| {
        ServiceError::InvalidInput(format!(
            "Task '{}' is not supported. Allowed values: rewrite, paraphrase, enhance",
            task.trim().to_lowercase()
        ))
    })
}

/// Non-empty, bounded conversation of user/assistant turns
pub fn validate_chat_messages(messages: &[ChatMessage]) -> ServiceResult<Vec<ChatMessage>> {
    if messages.is_empty() {
        return Err(ServiceError::InvalidInput("Messages list cannot be empty".to_string()));
    }
    if messages.len() > MAX_CHAT_MESSAGES {
        return Err(ServiceError::InvalidInput(format!(
            "Too many messages in conversation (max {})",
            MAX_CHAT_MESSAGES
        )));
    }

    messages
        .iter()
        .enumerate()
        .map(|(i, message)| {
            if message.role == ChatRole::System {
                return Err(ServiceError::InvalidInput(format!(
                    "Invalid role 'system' at message {}. Allowed roles: user, assistant",
                    i
                )));
            }
            let content = validate_text(
                &message.content,
                &format!("messages[{}].content", i),
                MAX_CHAT_CONTENT_LENGTH,
            )?;
            Ok(ChatMessage {
                role: message.role,
                content,
            })
        })
        .collect()
}

/// Normalize and check the fields present in a partial update
pub fn validate_update(update: &FlashcardUpdate) -> ServiceResult<FlashcardUpdate> {
    let mut normalized = update.clone();

    if let Some(word) = &update.word {
        normalized.word = Some(validate_word(word)?);
    }
    if let Some(translated) = &update.translated_word {
        normalized.translated_word =
            Some(validate_text(translated, "translatedWord", MAX_TRANSLATION_LENGTH)?);
    }
    if let Some(synonyms) = &update.synonyms {
        normalized.synonyms = Some(
            synonyms
                .iter()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        );
    }

    Ok(normalized)
}
