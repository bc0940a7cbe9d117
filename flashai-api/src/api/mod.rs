//! HTTP API handlers for flashai-api
//!
//! Every handler except `/health` answers with the `{data?, message?, errorCode?}`
//! envelope. Body and query rejections are converted to `INVALID_INPUT`.

pub mod chat;
pub mod flashcards;
pub mod health;
pub mod text;

pub use chat::chat_routes;
pub use flashcards::flashcard_routes;
pub use health::health_routes;
pub use text::text_routes;
