//! Delimited text codec for flashcard records
//!
//! Layout: one header row, then one row per record. Fields are comma-separated
//! and always double-quoted (embedded quotes doubled). `synonyms` is joined
//! with `;` inside its field. The same layout is used for the on-disk file,
//! export and import.

use flashai_common::models::now_timestamp;
use flashai_common::Flashcard;
use thiserror::Error;

pub const FIELD_DELIMITER: char = ',';
pub const SYNONYM_DELIMITER: char = ';';

/// Column names in persisted order
pub const HEADER: [&str; 6] = [
    "word",
    "translatedWord",
    "pronunciation",
    "synonyms",
    "isLearned",
    "createdAt",
];

const REQUIRED_COLUMNS: [&str; 4] = ["word", "translatedWord", "pronunciation", "synonyms"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("Unterminated quoted field starting on line {line}")]
    UnterminatedQuote { line: usize },

    #[error("Header is missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
}

/// Result of decoding a document
#[derive(Debug, Default)]
pub struct DecodedRecords {
    pub cards: Vec<Flashcard>,
    /// Rows dropped because their word was empty
    pub skipped: usize,
}

/// Serialize records (header included)
pub fn encode_records(cards: &[Flashcard]) -> String {
    let mut out = String::new();
    push_row(&mut out, HEADER.iter().copied());

    for card in cards {
        let synonyms = card.synonyms.join(&SYNONYM_DELIMITER.to_string());
        let is_learned = if card.is_learned { "true" } else { "false" };
        push_row(
            &mut out,
            [
                card.word.as_str(),
                card.translated_word.as_str(),
                card.pronunciation.as_str(),
                synonyms.as_str(),
                is_learned,
                card.created_at.as_str(),
            ],
        );
    }

    out
}

fn push_row<'a>(out: &mut String, fields: impl IntoIterator<Item = &'a str>) {
    for (i, field) in fields.into_iter().enumerate() {
        if i > 0 {
            out.push(FIELD_DELIMITER);
        }
        out.push('"');
        out.push_str(&field.replace('"', "\"\""));
        out.push('"');
    }
    out.push('\n');
}

/// Split text into rows of fields
///
/// Accepts quoted and unquoted fields, `\n` or `\r\n` line endings, and
/// newlines inside quoted fields. Blank lines are ignored.
pub fn parse_rows(text: &str) -> Result<Vec<Vec<String>>, CodecError> {
    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut row_has_content = false;
    let mut in_quotes = false;
    let mut line = 1;
    let mut quote_line = 1;

    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' => {
                in_quotes = true;
                quote_line = line;
                row_has_content = true;
            }
            FIELD_DELIMITER => {
                row.push(std::mem::take(&mut field));
                row_has_content = true;
            }
            '\r' => {}
            '\n' => {
                line += 1;
                if row_has_content {
                    row.push(std::mem::take(&mut field));
                    rows.push(std::mem::take(&mut row));
                }
                row_has_content = false;
            }
            _ => {
                field.push(c);
                row_has_content = true;
            }
        }
    }

    if in_quotes {
        return Err(CodecError::UnterminatedQuote { line: quote_line });
    }
    if row_has_content {
        row.push(field);
        rows.push(row);
    }

    Ok(rows)
}

/// Decode a document into flashcards
///
/// A first row whose first cell is `word` is treated as a header and columns
/// are mapped by name. Otherwise columns are read in persisted order.
pub fn decode_records(text: &str) -> Result<DecodedRecords, CodecError> {
    let mut rows = parse_rows(text)?.into_iter();
    let mut decoded = DecodedRecords::default();

    let first = match rows.next() {
        Some(row) => row,
        None => return Ok(decoded),
    };

    let (columns, pending) = if is_header(&first) {
        (ColumnMap::from_header(&first)?, None)
    } else {
        (ColumnMap::positional(), Some(first))
    };

    for row in pending.into_iter().chain(rows) {
        match columns.decode(&row) {
            Some(card) => decoded.cards.push(card),
            None => decoded.skipped += 1,
        }
    }

    Ok(decoded)
}

/// A header row starts with two known column names, in any case
///
/// One match is not enough: a headerless file may begin with the word "word".
fn is_header(row: &[String]) -> bool {
    row.len() >= 2 && row[..2].iter().all(|cell| is_column_name(cell))
}

fn is_column_name(cell: &str) -> bool {
    HEADER.iter().any(|name| cell.trim().eq_ignore_ascii_case(name))
}

struct ColumnMap {
    word: usize,
    translated_word: usize,
    pronunciation: usize,
    synonyms: usize,
    is_learned: Option<usize>,
    created_at: Option<usize>,
}

impl ColumnMap {
    fn positional() -> Self {
        Self {
            word: 0,
            translated_word: 1,
            pronunciation: 2,
            synonyms: 3,
            is_learned: Some(4),
            created_at: Some(5),
        }
    }

    fn from_header(header: &[String]) -> Result<Self, CodecError> {
        let find = |name: &str| {
            header
                .iter()
                .position(|cell| cell.trim().eq_ignore_ascii_case(name))
        };

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|name| find(name).is_none())
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(CodecError::MissingColumns(missing));
        }

        // Presence checked above
        Ok(Self {
            word: find("word").unwrap_or(0),
            translated_word: find("translatedWord").unwrap_or(1),
            pronunciation: find("pronunciation").unwrap_or(2),
            synonyms: find("synonyms").unwrap_or(3),
            is_learned: find("isLearned"),
            created_at: find("createdAt"),
        })
    }

    fn decode(&self, row: &[String]) -> Option<Flashcard> {
        let cell = |idx: usize| row.get(idx).map(|s| s.trim()).unwrap_or("");
        let optional = |idx: Option<usize>| idx.map(cell).unwrap_or("");

        let word = cell(self.word);
        if word.is_empty() {
            return None;
        }

        let synonyms = cell(self.synonyms)
            .split(SYNONYM_DELIMITER)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        let created_at = match optional(self.created_at) {
            "" => now_timestamp(),
            value => value.to_string(),
        };

        Some(Flashcard {
            word: word.to_string(),
            translated_word: cell(self.translated_word).to_string(),
            pronunciation: cell(self.pronunciation).to_string(),
            synonyms,
            is_learned: optional(self.is_learned).eq_ignore_ascii_case("true"),
            created_at,
        })
    }
}
