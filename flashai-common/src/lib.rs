//! # FlashAI Common Library
//!
//! Shared code for the FlashAI services including:
//! - Error type used during startup and configuration
//! - Configuration loading (CLI > ENV > TOML > defaults)
//! - API request/response types shared with clients
//! - Flashcard and chat message models

pub mod api;
pub mod config;
pub mod error;
pub mod models;

pub use error::{Error, Result};
pub use models::{ChatMessage, ChatRole, Flashcard};
