//! Prompt construction
//!
//! Pure functions from a feature input to the system/user prompt pair and,
//! for structured features, the function schema the model must call.

use super::FunctionSchema;
use serde_json::json;

pub const CREATE_FLASHCARD_FN: &str = "create_flashcard";
pub const GRAMMAR_CHECK_FN: &str = "grammar_check";

/// Prompt for a structured completion
#[derive(Debug, Clone)]
pub struct StructuredPrompt {
    pub system: String,
    pub user: String,
    pub schema: FunctionSchema,
}

/// Prompt for a free-text completion
#[derive(Debug, Clone)]
pub struct TextPrompt {
    pub system: String,
    pub user: String,
}

/// Requested flashcard translation target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetLanguage {
    /// Model detects the source language and translates to the other one
    #[default]
    Auto,
    /// Source is Vietnamese
    English,
    /// Source is English
    Vietnamese,
}

impl TargetLanguage {
    /// Case-insensitive parse of `auto`, `en`/`english`, `vi`/`vietnamese`
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "auto" => Some(Self::Auto),
            "en" | "english" => Some(Self::English),
            "vi" | "vietnamese" => Some(Self::Vietnamese),
            _ => None,
        }
    }

    fn direction(self) -> (&'static str, &'static str) {
        match self {
            Self::Vietnamese => (
                "English to Vietnamese",
                "The input word is English; translate it to Vietnamese.",
            ),
            Self::English => (
                "Vietnamese to English",
                "The input word is Vietnamese; translate it to English.",
            ),
            Self::Auto => (
                "Auto-detect",
                "Detect whether the word is English or Vietnamese and translate it to the other language.",
            ),
        }
    }
}

/// Text transformation requested from `/enhance-text`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnhanceTask {
    Rewrite,
    Paraphrase,
    Enhance,
}

impl EnhanceTask {
    pub const ALL: [EnhanceTask; 3] = [Self::Rewrite, Self::Paraphrase, Self::Enhance];

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "rewrite" => Some(Self::Rewrite),
            "paraphrase" => Some(Self::Paraphrase),
            "enhance" => Some(Self::Enhance),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rewrite => "rewrite",
            Self::Paraphrase => "paraphrase",
            Self::Enhance => "enhance",
        }
    }

    /// (goal, focus, expected outcome)
    fn brief(&self) -> (&'static str, &'static str, &'static str) {
        match self {
            Self::Rewrite => (
                "Rewrite the text for clarity, flow and readability while keeping its meaning",
                "sentence structure, word choice and coherence",
                "A clearer, more polished version of the original",
            ),
            Self::Paraphrase => (
                "Express the same ideas with different words and sentence structures",
                "vocabulary variation and syntactic diversity without changing meaning",
                "A fresh wording of the same content",
            ),
            Self::Enhance => (
                "Make the text more engaging, professional and impactful",
                "sophistication, persuasiveness and style",
                "A more compelling, professionally written version",
            ),
        }
    }
}

pub fn flashcard_prompt(word: &str, target: TargetLanguage) -> StructuredPrompt {
    let (direction, note) = target.direction();

    let system = format!(
        "You are an expert English-Vietnamese lexicographer who writes flashcards for language learners.\n\
         \n\
         Work through these steps before answering:\n\
         1. ANALYZE the word: source language, part of speech, main meaning.\n\
         2. TRANSLATE it with the most common, learner-appropriate rendering.\n\
         3. Give the PRONUNCIATION of the source word in IPA.\n\
         4. Pick exactly 3 SYNONYMS in the source language.\n\
         \n\
         CURRENT TASK: {direction} translation\n\
         CONTEXT: {note}"
    );

    let user = format!(
        "Create a flashcard for the word: \"{word}\"\n\
         Return the word exactly as given. Respond by calling the {CREATE_FLASHCARD_FN} function."
    );

    let schema = FunctionSchema::new(
        CREATE_FLASHCARD_FN,
        "Create a language learning flashcard with translation, pronunciation and synonyms",
        json!({
            "type": "object",
            "properties": {
                "word": {
                    "type": "string",
                    "description": "The original word, exactly as provided"
                },
                "translatedWord": {
                    "type": "string",
                    "description": "Translation of the word into the target language"
                },
                "pronunciation": {
                    "type": "string",
                    "description": "IPA pronunciation of the original word"
                },
                "synonyms": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "Exactly 3 synonyms in the same language as the original word",
                    "minItems": 3,
                    "maxItems": 3
                }
            },
            "required": ["word", "translatedWord", "pronunciation", "synonyms"]
        }),
    );

    StructuredPrompt { system, user, schema }
}

pub fn grammar_prompt(text: &str) -> StructuredPrompt {
    let system = "You are an expert English grammar coach for language learners.\n\
                  \n\
                  Examine the text along four branches:\n\
                  - STRUCTURE: syntax, subject-verb agreement, tense consistency\n\
                  - GRAMMAR: articles, prepositions, pronoun agreement\n\
                  - STYLE: word choice, redundancy, register\n\
                  - COMMON ERRORS: homophones, irregular verbs, comma splices\n\
                  \n\
                  Identify every error, correct it without changing the meaning or voice, \
                  and explain each correction so the learner can improve."
        .to_string();

    let user = format!(
        "Check the grammar of the following text:\n\
         \n\
         TEXT: \"{text}\"\n\
         \n\
         Respond by calling the {GRAMMAR_CHECK_FN} function."
    );

    let schema = FunctionSchema::new(
        GRAMMAR_CHECK_FN,
        "Report grammar corrections with explanations",
        json!({
            "type": "object",
            "properties": {
                "correctedText": {
                    "type": "string",
                    "description": "The text with all errors corrected, keeping meaning and style"
                },
                "errors": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "Each error found, with a short explanation"
                }
            },
            "required": ["correctedText", "errors"]
        }),
    );

    StructuredPrompt { system, user, schema }
}

pub fn enhance_prompt(text: &str, task: EnhanceTask) -> TextPrompt {
    let (goal, focus, outcome) = task.brief();
    let task_name = task.as_str();

    let system = format!(
        "You are an expert writing coach and editor.\n\
         \n\
         Reason first, then act:\n\
         1. Identify the main message, audience and current style.\n\
         2. Plan vocabulary and sentence-structure changes.\n\
         3. Apply them while preserving the original intent.\n\
         4. Review the result for clarity and natural flow.\n\
         \n\
         CURRENT TASK: {}\n\
         GOAL: {goal}\n\
         FOCUS AREAS: {focus}\n\
         EXPECTED OUTCOME: {outcome}",
        task_name.to_uppercase()
    );

    let user = format!(
        "Please {task_name} the following text.\n\
         \n\
         ORIGINAL TEXT: \"{text}\"\n\
         \n\
         Reply with the revised text only."
    );

    TextPrompt { system, user }
}

pub fn humanize_prompt(text: &str) -> TextPrompt {
    let system = "You rewrite AI-generated text so it reads as if a person wrote it.\n\
                  \n\
                  1. Spot robotic phrasing, repetitive structures and overly formal wording.\n\
                  2. Decide how a person would naturally say the same thing.\n\
                  3. Rewrite with varied sentence lengths, natural transitions and a personal voice.\n\
                  4. Keep the original message intact."
        .to_string();

    let user = format!(
        "Humanize the following text:\n\
         \n\
         TEXT: \"{text}\"\n\
         \n\
         Reply with the rewritten text only."
    );

    TextPrompt { system, user }
}

pub fn ai_detection_prompt(text: &str) -> TextPrompt {
    let system = "You are an expert at telling AI-generated text from human writing.\n\
                  \n\
                  Weigh linguistic patterns, stylistic markers, structure and typical AI \
                  signatures such as uniform sentences, generic phrasing and flawless grammar.\n\
                  \n\
                  PROBABILITY SCALE:\n\
                  0-20: very likely human\n\
                  21-40: probably human\n\
                  41-60: mixed indicators\n\
                  61-80: probably AI\n\
                  81-100: very likely AI"
        .to_string();

    let user = format!(
        "Estimate the probability that this text was AI-generated:\n\
         \n\
         TEXT: \"{text}\"\n\
         \n\
         Respond with just the probability number (0-100)."
    );

    TextPrompt { system, user }
}

/// Persona prepended to every chat conversation
pub fn chat_system_prompt() -> &'static str {
    "You are a friendly English and Vietnamese language tutor.\n\
     \n\
     For each message: work out what the student needs, consider their level, \
     answer clearly and accurately, and add examples, usage notes or cultural context \
     where they help. Be patient and encouraging."
}
