//! flashai-api library - language-learning backend
//!
//! Record store, model client, prompt construction, orchestration services and
//! the HTTP boundary. `main.rs` wires these together from `AppConfig`.

use axum::http::{HeaderValue, Method};
use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;
pub mod llm;
pub mod services;
pub mod store;

pub use error::{ServiceError, ServiceResult};

use llm::ModelClient;
use services::{FlashcardService, TextService};
use store::FlashcardStore;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub flashcards: FlashcardService,
    pub text: TextService,
    /// Server startup timestamp (for uptime calculation)
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    /// Wire services around one model client and one store
    pub fn new(model: Arc<dyn ModelClient>, store: Arc<FlashcardStore>) -> Self {
        Self {
            flashcards: FlashcardService::new(model.clone(), store),
            text: TextService::new(model),
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::health_routes())
        .merge(api::flashcard_routes())
        .merge(api::text_routes())
        .merge(api::chat_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Startup banner with the version and build metadata from `build.rs`
pub fn build_banner() -> String {
    format!(
        "FlashAI API v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE"),
    )
}

/// CORS policy for the browser UI
///
/// An empty list or `*` allows any origin. Unparseable origins are skipped.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(parsed))
}
