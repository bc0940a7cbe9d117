//! Orchestration services
//!
//! One operation per feature: validate input, build the prompt, call the model
//! client, shape the result and (for flashcards) persist it.

pub mod flashcards;
pub mod text;
pub mod validators;

pub use flashcards::FlashcardService;
pub use text::TextService;

/// Longest input excerpt written to logs
const LOG_SUMMARY_CHARS: usize = 50;

/// Truncate user input for log lines
pub(crate) fn summarize(text: &str) -> String {
    match text.char_indices().nth(LOG_SUMMARY_CHARS) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
