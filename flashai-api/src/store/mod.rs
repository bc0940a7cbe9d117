//! Flashcard record store
//!
//! Flat store of flashcards keyed by `word`, kept in insertion order.
//!
//! # Durability
//! Write-through: every mutation persists the complete record set before it
//! returns. The file is written to a sibling `.tmp` file and renamed over the
//! original, so a crash leaves either the old or the new file, never a partial
//! one. The in-memory set is only replaced after the write succeeds.
//!
//! # Concurrency
//! Mutations hold the write lock across read-modify-persist, which serializes
//! them. Reads take the read lock and observe the last committed snapshot.

pub mod codec;

use flashai_common::models::FlashcardUpdate;
use flashai_common::Flashcard;
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

pub use codec::CodecError;

/// Record store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Flashcard '{0}' not found")]
    NotFound(String),

    #[error("Flashcard for word '{0}' already exists")]
    AlreadyExists(String),

    #[error("Storage I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed flashcard data: {0}")]
    Codec(#[from] CodecError),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Outcome of a bulk import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
}

enum Backing {
    File(PathBuf),
    Memory,
}

/// Flashcard store with write-through file persistence
pub struct FlashcardStore {
    records: RwLock<Vec<Flashcard>>,
    backing: Backing,
}

impl FlashcardStore {
    /// Open the store at `path`, loading existing records or creating an empty
    /// file with a header row
    pub async fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();

        let records = match tokio::fs::read_to_string(&path).await {
            Ok(text) => {
                let decoded = codec::decode_records(&text)?;
                if decoded.skipped > 0 {
                    warn!(
                        path = %path.display(),
                        skipped = decoded.skipped,
                        "Skipped flashcard rows with empty word"
                    );
                }
                info!(
                    path = %path.display(),
                    count = decoded.cards.len(),
                    "Loaded flashcards"
                );
                decoded.cards
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    tokio::fs::create_dir_all(parent)
                        .await
                        .map_err(|source| StoreError::Io {
                            path: parent.to_path_buf(),
                            source,
                        })?;
                }
                write_atomic(&path, &codec::encode_records(&[])).await?;
                info!(path = %path.display(), "Created new flashcards file");
                Vec::new()
            }
            Err(source) => return Err(StoreError::Io { path, source }),
        };

        Ok(Self {
            records: RwLock::new(records),
            backing: Backing::File(path),
        })
    }

    /// Store without a backing file
    pub fn in_memory() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            backing: Backing::Memory,
        }
    }

    /// Backing file path, if any
    pub fn path(&self) -> Option<&Path> {
        match &self.backing {
            Backing::File(path) => Some(path),
            Backing::Memory => None,
        }
    }

    /// Flush the current snapshot. Called on shutdown.
    pub async fn close(&self) -> StoreResult<()> {
        let records = self.records.read().await;
        self.persist(&records).await?;
        debug!(count = records.len(), "Flashcard store closed");
        Ok(())
    }

    /// Append a new record; fails if the word is already present
    pub async fn create(&self, card: Flashcard) -> StoreResult<Flashcard> {
        let mut records = self.records.write().await;
        if records.iter().any(|c| c.word == card.word) {
            return Err(StoreError::AlreadyExists(card.word));
        }

        let mut next = records.clone();
        next.push(card.clone());
        self.persist(&next).await?;
        *records = next;

        debug!(word = %card.word, "Flashcard stored");
        Ok(card)
    }

    /// Snapshot of all records in insertion order
    pub async fn get_all(&self) -> Vec<Flashcard> {
        self.records.read().await.clone()
    }

    pub async fn get(&self, word: &str) -> StoreResult<Flashcard> {
        self.records
            .read()
            .await
            .iter()
            .find(|c| c.word == word)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(word.to_string()))
    }

    pub async fn contains(&self, word: &str) -> bool {
        self.records.read().await.iter().any(|c| c.word == word)
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Merge `update` into the record keyed by `word`
    ///
    /// Renaming to a word held by another record fails with `AlreadyExists`.
    pub async fn update(&self, word: &str, update: &FlashcardUpdate) -> StoreResult<Flashcard> {
        let mut records = self.records.write().await;
        let index = records
            .iter()
            .position(|c| c.word == word)
            .ok_or_else(|| StoreError::NotFound(word.to_string()))?;

        if let Some(new_word) = update.word.as_deref() {
            if new_word != word && records.iter().any(|c| c.word == new_word) {
                return Err(StoreError::AlreadyExists(new_word.to_string()));
            }
        }

        let mut next = records.clone();
        update.apply_to(&mut next[index]);
        let updated = next[index].clone();
        self.persist(&next).await?;
        *records = next;

        debug!(word, "Flashcard updated");
        Ok(updated)
    }

    pub async fn set_learned(&self, word: &str, is_learned: bool) -> StoreResult<Flashcard> {
        self.update(word, &FlashcardUpdate::learned(is_learned)).await
    }

    pub async fn delete(&self, word: &str) -> StoreResult<()> {
        let mut records = self.records.write().await;
        let index = records
            .iter()
            .position(|c| c.word == word)
            .ok_or_else(|| StoreError::NotFound(word.to_string()))?;

        let mut next = records.clone();
        next.remove(index);
        self.persist(&next).await?;
        *records = next;

        debug!(word, "Flashcard deleted");
        Ok(())
    }

    /// Serialize all records in the transport format
    pub async fn export_all(&self) -> String {
        codec::encode_records(&self.records.read().await)
    }

    /// Append all records parsed from `text`
    ///
    /// Without `dedupe`, rows are appended even when their word already exists.
    /// With `dedupe`, such rows (and repeats within `text`) are skipped.
    pub async fn import_many(&self, text: &str, dedupe: bool) -> StoreResult<ImportSummary> {
        let decoded = codec::decode_records(text)?;
        let mut summary = ImportSummary {
            imported: 0,
            skipped: decoded.skipped,
        };

        let mut records = self.records.write().await;
        let mut next = records.clone();
        let mut seen: HashSet<String> = if dedupe {
            next.iter().map(|c| c.word.clone()).collect()
        } else {
            HashSet::new()
        };

        for card in decoded.cards {
            if dedupe && !seen.insert(card.word.clone()) {
                summary.skipped += 1;
                continue;
            }
            next.push(card);
            summary.imported += 1;
        }

        self.persist(&next).await?;
        *records = next;

        info!(
            imported = summary.imported,
            skipped = summary.skipped,
            dedupe,
            "Flashcards imported"
        );
        Ok(summary)
    }

    async fn persist(&self, records: &[Flashcard]) -> StoreResult<()> {
        match &self.backing {
            Backing::File(path) => write_atomic(path, &codec::encode_records(records)).await,
            Backing::Memory => Ok(()),
        }
    }
}

/// Write to `<path>.tmp`, then rename over `path`
async fn write_atomic(path: &Path, contents: &str) -> StoreResult<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    tokio::fs::write(&tmp, contents)
        .await
        .map_err(|source| StoreError::Io {
            path: tmp.clone(),
            source,
        })?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })
}
