//! Tutor chat endpoint

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use flashai_common::api::{ApiResponse, ChatRequest, ChatResponse};

use crate::error::ServiceResult;
use crate::AppState;

/// POST /chat
///
/// The tutor persona is prepended server-side; clients send only
/// `user`/`assistant` turns.
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> ServiceResult<Json<ApiResponse<ChatResponse>>> {
    let Json(request) = payload?;
    let response = state.text.chat(&request.messages).await?;
    Ok(Json(ApiResponse::ok(ChatResponse { response })))
}

pub fn chat_routes() -> Router<AppState> {
    Router::new().route("/chat", post(chat))
}
