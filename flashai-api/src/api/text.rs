//! Text tool endpoints

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use flashai_common::api::{
    ApiResponse, EnhanceRequest, EnhanceResponse, GrammarCheckResponse, HumanizeResponse,
    ProbabilityResponse, TextComplexity, TextRequest,
};

use crate::error::ServiceResult;
use crate::services::text::analyze_complexity;
use crate::AppState;

type Envelope<T> = ServiceResult<Json<ApiResponse<T>>>;

/// POST /grammar-check
pub async fn grammar_check(
    State(state): State<AppState>,
    payload: Result<Json<TextRequest>, JsonRejection>,
) -> Envelope<GrammarCheckResponse> {
    let Json(request) = payload?;
    Ok(Json(ApiResponse::ok(state.text.check_grammar(&request.text).await?)))
}

/// POST /enhance-text
pub async fn enhance_text(
    State(state): State<AppState>,
    payload: Result<Json<EnhanceRequest>, JsonRejection>,
) -> Envelope<EnhanceResponse> {
    let Json(request) = payload?;
    let enhanced_text = state.text.enhance(&request.text, &request.task).await?;
    Ok(Json(ApiResponse::ok(EnhanceResponse { enhanced_text })))
}

/// POST /humanize-text
pub async fn humanize_text(
    State(state): State<AppState>,
    payload: Result<Json<TextRequest>, JsonRejection>,
) -> Envelope<HumanizeResponse> {
    let Json(request) = payload?;
    let humanized_text = state.text.humanize(&request.text).await?;
    Ok(Json(ApiResponse::ok(HumanizeResponse { humanized_text })))
}

/// POST /ai-probability
pub async fn ai_probability(
    State(state): State<AppState>,
    payload: Result<Json<TextRequest>, JsonRejection>,
) -> Envelope<ProbabilityResponse> {
    let Json(request) = payload?;
    let probability = state.text.ai_probability(&request.text).await?;
    Ok(Json(ApiResponse::ok(ProbabilityResponse { probability })))
}

/// POST /analyze-text
///
/// Computed locally; never calls the model provider.
pub async fn analyze_text(
    payload: Result<Json<TextRequest>, JsonRejection>,
) -> Envelope<TextComplexity> {
    let Json(request) = payload?;
    Ok(Json(ApiResponse::ok(analyze_complexity(&request.text)?)))
}

pub fn text_routes() -> Router<AppState> {
    Router::new()
        .route("/grammar-check", post(grammar_check))
        .route("/enhance-text", post(enhance_text))
        .route("/humanize-text", post(humanize_text))
        .route("/ai-probability", post(ai_probability))
        .route("/analyze-text", post(analyze_text))
}
