//! Shared test helpers: a scripted model client and app builders

#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Request;
use flashai_api::llm::{CompletionOptions, FunctionArgs, FunctionSchema, ModelClient, ModelError};
use flashai_api::store::FlashcardStore;
use flashai_api::{build_router, AppState};
use flashai_common::ChatMessage;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Model client that replays queued responses and counts calls
#[derive(Default)]
pub struct StubModelClient {
    structured: Mutex<VecDeque<Result<FunctionArgs, ModelError>>>,
    text: Mutex<VecDeque<Result<String, ModelError>>>,
    structured_calls: AtomicUsize,
    text_calls: AtomicUsize,
    last_system_prompt: Mutex<Option<String>>,
    last_messages: Mutex<Vec<ChatMessage>>,
}

impl StubModelClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_structured(&self, value: Value) {
        let args = match value {
            Value::Object(map) => map,
            other => panic!("structured response must be an object, got {}", other),
        };
        self.structured.lock().unwrap().push_back(Ok(args));
    }

    pub fn push_structured_error(&self, err: ModelError) {
        self.structured.lock().unwrap().push_back(Err(err));
    }

    pub fn push_text(&self, reply: &str) {
        self.text.lock().unwrap().push_back(Ok(reply.to_string()));
    }

    pub fn push_text_error(&self, err: ModelError) {
        self.text.lock().unwrap().push_back(Err(err));
    }

    pub fn structured_calls(&self) -> usize {
        self.structured_calls.load(Ordering::SeqCst)
    }

    pub fn text_calls(&self) -> usize {
        self.text_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.structured_calls() + self.text_calls()
    }

    pub fn last_system_prompt(&self) -> Option<String> {
        self.last_system_prompt.lock().unwrap().clone()
    }

    pub fn last_messages(&self) -> Vec<ChatMessage> {
        self.last_messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelClient for StubModelClient {
    async fn complete_text(
        &self,
        system_prompt: &str,
        messages: &[ChatMessage],
        _options: &CompletionOptions,
    ) -> Result<String, ModelError> {
        self.text_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_system_prompt.lock().unwrap() = Some(system_prompt.to_string());
        *self.last_messages.lock().unwrap() = messages.to_vec();

        self.text
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ModelError::SchemaViolation("no canned text reply".into())))
    }

    async fn complete_structured(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        schema: &FunctionSchema,
    ) -> Result<FunctionArgs, ModelError> {
        self.structured_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_system_prompt.lock().unwrap() = Some(system_prompt.to_string());
        *self.last_messages.lock().unwrap() = vec![ChatMessage::user(user_prompt)];

        let canned = self
            .structured
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ModelError::SchemaViolation("no canned structured reply".into())))?;

        // Same key check the real client performs
        let raw = serde_json::to_string(&canned).unwrap();
        schema.parse_arguments(&raw)
    }
}

/// Router over an in-memory store and the given stub
pub fn setup_app(stub: Arc<StubModelClient>) -> (axum::Router, Arc<FlashcardStore>) {
    let store = Arc::new(FlashcardStore::in_memory());
    let state = AppState::new(stub, store.clone());
    (build_router(state), store)
}

pub fn apple_args() -> Value {
    serde_json::json!({
        "word": "apple",
        "translatedWord": "táo",
        "pronunciation": "/ˈæpəl/",
        "synonyms": ["fruit", "pome", "orchard fruit"]
    })
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}
