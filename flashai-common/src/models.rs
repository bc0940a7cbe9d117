//! Domain models shared between the server and its clients
//!
//! Field names follow the JSON wire format (`translatedWord`, `isLearned`, ...)
//! so the UI can consume records without remapping.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Maximum length of a flashcard word, in characters
pub const MAX_WORD_LENGTH: usize = 100;

/// A persisted vocabulary record keyed by `word`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flashcard {
    /// Original input text; unique key within the store
    pub word: String,
    /// Target-language rendering produced by the model
    pub translated_word: String,
    /// Phonetic guide (IPA)
    pub pronunciation: String,
    /// Related words in the source language. Never null.
    #[serde(default)]
    pub synonyms: Vec<String>,
    /// Learning progress flag
    #[serde(default)]
    pub is_learned: bool,
    /// Creation timestamp (RFC 3339), set once
    pub created_at: String,
}

impl Flashcard {
    /// Create a new, not-yet-learned flashcard stamped with the current time
    pub fn new(
        word: impl Into<String>,
        translated_word: impl Into<String>,
        pronunciation: impl Into<String>,
        synonyms: Vec<String>,
    ) -> Self {
        Self {
            word: word.into(),
            translated_word: translated_word.into(),
            pronunciation: pronunciation.into(),
            synonyms,
            is_learned: false,
            created_at: now_timestamp(),
        }
    }
}

/// Partial update of a flashcard; absent fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlashcardUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translated_word: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pronunciation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synonyms: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_learned: Option<bool>,
}

impl FlashcardUpdate {
    /// Update touching only the learned flag
    pub fn learned(is_learned: bool) -> Self {
        Self {
            is_learned: Some(is_learned),
            ..Default::default()
        }
    }

    /// Merge the provided fields into `card`
    pub fn apply_to(&self, card: &mut Flashcard) {
        if let Some(word) = &self.word {
            card.word = word.clone();
        }
        if let Some(translated) = &self.translated_word {
            card.translated_word = translated.clone();
        }
        if let Some(pronunciation) = &self.pronunciation {
            card.pronunciation = pronunciation.clone();
        }
        if let Some(synonyms) = &self.synonyms {
            card.synonyms = synonyms.clone();
        }
        if let Some(is_learned) = self.is_learned {
            card.is_learned = is_learned;
        }
    }
}

/// Speaker of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
    System,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
            ChatRole::System => "system",
        }
    }
}

/// One turn of a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: ChatRole::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: ChatRole::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: ChatRole::Assistant, content: content.into() }
    }
}

/// Current UTC time formatted for `createdAt`
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flashcard_serializes_camel_case() {
        let card = Flashcard::new("apple", "táo", "/ˈæpəl/", vec!["fruit".into()]);
        let json = serde_json::to_value(&card).unwrap();

        assert_eq!(json["word"], "apple");
        assert_eq!(json["translatedWord"], "táo");
        assert_eq!(json["isLearned"], false);
        assert!(json["createdAt"].is_string());
    }

    #[test]
    fn test_missing_synonyms_default_to_empty() {
        let card: Flashcard = serde_json::from_str(
            r#"{"word":"a","translatedWord":"b","pronunciation":"c","createdAt":"x"}"#,
        )
        .unwrap();
        assert!(card.synonyms.is_empty());
        assert!(!card.is_learned);
    }

    #[test]
    fn test_update_only_touches_present_fields() {
        let mut card = Flashcard::new("apple", "táo", "/ˈæpəl/", vec![]);
        let created = card.created_at.clone();

        FlashcardUpdate {
            pronunciation: Some("/æpl/".into()),
            is_learned: Some(true),
            ..Default::default()
        }
        .apply_to(&mut card);

        assert_eq!(card.word, "apple");
        assert_eq!(card.translated_word, "táo");
        assert_eq!(card.pronunciation, "/æpl/");
        assert!(card.is_learned);
        assert_eq!(card.created_at, created);
    }

    #[test]
    fn test_chat_role_rejects_unknown() {
        let result: std::result::Result<ChatMessage, _> =
            serde_json::from_str(r#"{"role":"bot","content":"hi"}"#);
        assert!(result.is_err());
    }
}
