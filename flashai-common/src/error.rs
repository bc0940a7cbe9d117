//! Common error types for FlashAI

use thiserror::Error;

/// Common result type for FlashAI operations
pub type Result<T> = std::result::Result<T, Error>;

/// Startup errors shared by FlashAI crates
///
/// Request-time failures have their own types in `flashai-api`.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration missing or invalid. Fatal at startup.
    #[error("Configuration error: {0}")]
    Config(String),
}
