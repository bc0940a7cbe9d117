//! Flashcard orchestration
//!
//! Validate → prompt → structured completion → shape → persist. The store is
//! checked before the model is called, and again atomically on insert.

use chrono::{DateTime, FixedOffset};
use flashai_common::api::LearningStatistics;
use flashai_common::models::FlashcardUpdate;
use flashai_common::Flashcard;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use super::{summarize, validators};
use crate::error::{ServiceError, ServiceResult};
use crate::llm::{json_type_name, prompts, FunctionArgs, ModelClient};
use crate::store::{FlashcardStore, ImportSummary};

/// Flashcard generation and management
#[derive(Clone)]
pub struct FlashcardService {
    model: Arc<dyn ModelClient>,
    store: Arc<FlashcardStore>,
}

impl FlashcardService {
    pub fn new(model: Arc<dyn ModelClient>, store: Arc<FlashcardStore>) -> Self {
        Self { model, store }
    }

    /// Generate a flashcard for `word` and persist it
    pub async fn create(&self, word: &str, target_language: Option<&str>) -> ServiceResult<Flashcard> {
        let word = validators::validate_word(word)?;
        let target = validators::validate_target_language(target_language)?;
        let started = Instant::now();

        info!(operation = "create_flashcard", word = %summarize(&word), ?target, "Creating flashcard");

        if self.store.contains(&word).await {
            warn!(operation = "create_flashcard", word = %word, "Flashcard already exists");
            return Err(ServiceError::AlreadyExists(word));
        }

        let prompt = prompts::flashcard_prompt(&word, target);
        let args = self
            .model
            .complete_structured(&prompt.system, &prompt.user, &prompt.schema)
            .await?;

        let card = shape_flashcard(&word, &args)?;
        let stored = self.store.create(card).await?;

        info!(
            operation = "create_flashcard",
            word = %stored.word,
            elapsed_ms = started.elapsed().as_millis(),
            "Flashcard created"
        );
        Ok(stored)
    }

    pub async fn list(&self) -> Vec<Flashcard> {
        self.store.get_all().await
    }

    pub async fn get(&self, word: &str) -> ServiceResult<Flashcard> {
        Ok(self.store.get(word).await?)
    }

    pub async fn list_by_learned(&self, is_learned: bool) -> Vec<Flashcard> {
        self.store
            .get_all()
            .await
            .into_iter()
            .filter(|card| card.is_learned == is_learned)
            .collect()
    }

    pub async fn update(&self, word: &str, update: &FlashcardUpdate) -> ServiceResult<Flashcard> {
        let update = validators::validate_update(update)?;
        let updated = self.store.update(word, &update).await?;
        info!(operation = "update_flashcard", word, new_word = %updated.word, "Flashcard updated");
        Ok(updated)
    }

    pub async fn delete(&self, word: &str) -> ServiceResult<()> {
        self.store.delete(word).await?;
        info!(operation = "delete_flashcard", word, "Flashcard deleted");
        Ok(())
    }

    pub async fn set_learned(&self, word: &str, is_learned: bool) -> ServiceResult<Flashcard> {
        let card = self.store.set_learned(word, is_learned).await?;
        info!(operation = "mark_learned", word, is_learned, "Learning status updated");
        Ok(card)
    }

    pub async fn export(&self) -> String {
        self.store.export_all().await
    }

    pub async fn import(&self, text: &str, dedupe: bool) -> ServiceResult<ImportSummary> {
        if text.trim().is_empty() {
            return Err(ServiceError::InvalidInput("Import text must not be empty".to_string()));
        }
        Ok(self.store.import_many(text, dedupe).await?)
    }

    pub async fn statistics(&self) -> LearningStatistics {
        compute_statistics(&self.store.get_all().await)
    }
}

/// Build the stored record from validated model output
///
/// The key is always the validated input word, whatever the model echoes back.
fn shape_flashcard(word: &str, args: &FunctionArgs) -> ServiceResult<Flashcard> {
    let translated_word = string_field(args, "translatedWord")?.trim().to_string();
    if translated_word.is_empty() {
        return Err(ServiceError::SchemaViolation(
            "translatedWord must not be empty".to_string(),
        ));
    }

    let pronunciation = string_field(args, "pronunciation")?.trim().to_string();

    let synonyms = match args.get("synonyms") {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str().map(|s| s.trim().to_string()).ok_or_else(|| {
                    ServiceError::SchemaViolation(format!(
                        "synonyms must contain strings, got {}",
                        json_type_name(item)
                    ))
                })
            })
            .filter(|s| !matches!(s, Ok(s) if s.is_empty()))
            .collect::<ServiceResult<Vec<String>>>()?,
        Some(other) => {
            return Err(ServiceError::SchemaViolation(format!(
                "synonyms must be an array, got {}",
                json_type_name(other)
            )))
        }
        None => Vec::new(),
    };

    Ok(Flashcard::new(word, translated_word, pronunciation, synonyms))
}

pub(crate) fn string_field<'a>(args: &'a FunctionArgs, field: &str) -> ServiceResult<&'a str> {
    match args.get(field) {
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(ServiceError::SchemaViolation(format!(
            "{} must be a string, got {}",
            field,
            json_type_name(other)
        ))),
        None => Err(ServiceError::SchemaViolation(format!("{} is missing", field))),
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn recommendation(progress: f64, total: usize) -> &'static str {
    if total == 0 {
        "Start by creating your first flashcard!"
    } else if progress < 25.0 {
        "Keep practicing! Focus on reviewing your flashcards regularly."
    } else if progress < 50.0 {
        "Good progress! Try to review learned cards periodically to maintain retention."
    } else if progress < 75.0 {
        "Great work! You're making excellent progress. Keep it up!"
    } else {
        "Outstanding! Consider adding more challenging vocabulary to continue growing."
    }
}

pub(crate) fn compute_statistics(cards: &[Flashcard]) -> LearningStatistics {
    let total = cards.len();
    let learned = cards.iter().filter(|c| c.is_learned).count();
    let progress = if total > 0 {
        round1(learned as f64 / total as f64 * 100.0)
    } else {
        0.0
    };

    let mut dated: Vec<(DateTime<FixedOffset>, &str)> = cards
        .iter()
        .filter_map(|c| {
            DateTime::parse_from_rfc3339(&c.created_at)
                .ok()
                .map(|ts| (ts, c.created_at.as_str()))
        })
        .collect();
    dated.sort_by_key(|(ts, _)| *ts);

    let (earliest, latest) = match (dated.first(), dated.last()) {
        (Some(first), Some(last)) => (Some(*first), Some(*last)),
        _ => (None, None),
    };

    let (per_day, learned_per_day) = match (earliest, latest) {
        (Some((first, _)), Some((last, _))) => {
            let days = (last - first).num_days() + 1;
            (
                Some(round1(total as f64 / days as f64)),
                Some(round1(learned as f64 / days as f64)),
            )
        }
        _ => (None, None),
    };

    LearningStatistics {
        total_flashcards: total,
        learned_flashcards: learned,
        unlearned_flashcards: total - learned,
        learning_progress_percentage: progress,
        earliest_creation_date: earliest.map(|(_, raw)| raw.to_string()),
        latest_creation_date: latest.map(|(_, raw)| raw.to_string()),
        average_flashcards_per_day: per_day,
        average_learned_per_day: learned_per_day,
        learning_recommendation: recommendation(progress, total).to_string(),
    }
}
