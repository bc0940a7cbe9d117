//! Shared API request/response types
//!
//! Every FlashAI response body (except `/health`) uses the same envelope:
//! `{data?, message?, errorCode?}`. The UI branches on `errorCode` instead of
//! parsing `message`.

use serde::{Deserialize, Serialize};

use crate::models::ChatMessage;

// ========================================
// Response Envelope
// ========================================

/// Stable response envelope
///
/// # Examples
///
/// ```
/// use flashai_common::api::ApiResponse;
///
/// let ok = ApiResponse::ok(42);
/// assert_eq!(ok.data, Some(42));
/// assert!(ok.error_code.is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<ErrorCode>,
}

impl<T> ApiResponse<T> {
    /// Successful response carrying `data`
    pub fn ok(data: T) -> Self {
        Self {
            data: Some(data),
            message: None,
            error_code: None,
        }
    }

    /// Successful response carrying `data` and a human-readable message
    pub fn ok_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            data: Some(data),
            message: Some(message.into()),
            error_code: None,
        }
    }
}

impl ApiResponse<()> {
    /// Successful response with only a message
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            data: None,
            message: Some(message.into()),
            error_code: None,
        }
    }

    /// Error response
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            data: None,
            message: Some(message.into()),
            error_code: Some(code),
        }
    }
}

// ========================================
// Error Codes
// ========================================

/// Machine-readable error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidInput,
    AlreadyExists,
    NotFound,
    UpstreamRejected,
    UpstreamUnavailable,
    SchemaViolation,
    ParseError,
    StorageError,
    InternalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidInput => "INVALID_INPUT",
            ErrorCode::AlreadyExists => "ALREADY_EXISTS",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::UpstreamRejected => "UPSTREAM_REJECTED",
            ErrorCode::UpstreamUnavailable => "UPSTREAM_UNAVAILABLE",
            ErrorCode::SchemaViolation => "SCHEMA_VIOLATION",
            ErrorCode::ParseError => "PARSE_ERROR",
            ErrorCode::StorageError => "STORAGE_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }
}

// ========================================
// Flashcard Requests / Responses
// ========================================

/// POST /flashcards
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFlashcardRequest {
    pub word: String,
    /// `auto` (default), `en`/`english`, `vi`/`vietnamese`
    #[serde(default)]
    pub target_language: Option<String>,
}

/// PUT /flashcards/{word}/learned?is_learned=bool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearnedQuery {
    pub is_learned: bool,
}

/// POST /flashcards/import
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportRequest {
    pub text: String,
    /// Skip rows whose word is already stored
    #[serde(default)]
    pub dedupe: bool,
}

/// GET /flashcards/statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningStatistics {
    pub total_flashcards: usize,
    pub learned_flashcards: usize,
    pub unlearned_flashcards: usize,
    /// Rounded to one decimal; 0 when the store is empty
    pub learning_progress_percentage: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub earliest_creation_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_creation_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_flashcards_per_day: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_learned_per_day: Option<f64>,
    pub learning_recommendation: String,
}

// ========================================
// Text Requests / Responses
// ========================================

/// Body of the single-text endpoints (grammar, humanize, probability, analysis)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextRequest {
    pub text: String,
}

/// POST /enhance-text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnhanceRequest {
    pub text: String,
    /// `rewrite`, `paraphrase` or `enhance`
    pub task: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrammarCheckResponse {
    pub corrected_text: String,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhanceResponse {
    pub enhanced_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HumanizeResponse {
    pub humanized_text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbabilityResponse {
    /// 0..=100
    pub probability: u8,
}

/// POST /chat
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

/// Reading level bucket from local text analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComplexityLevel {
    Beginner,
    Intermediate,
    Advanced,
}

/// POST /analyze-text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextComplexity {
    pub word_count: usize,
    pub sentence_count: usize,
    pub average_word_length: f64,
    pub average_sentence_length: f64,
    pub complexity_level: ComplexityLevel,
    /// 1 (Beginner) to 3 (Advanced)
    pub difficulty_score: u8,
    pub reading_time_minutes: f64,
}

// ========================================
// Health
// ========================================

/// Health check response (liveness only, not enveloped)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
    pub uptime_seconds: u64,
}
