//! Flashcard endpoints
//!
//! Keys in the path are percent-decoded by axum before lookup.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    routing::{get, post, put, MethodRouter},
    Json, Router,
};
use flashai_common::api::{
    ApiResponse, CreateFlashcardRequest, ImportRequest, LearnedQuery, LearningStatistics,
};
use flashai_common::models::FlashcardUpdate;
use flashai_common::Flashcard;

use crate::error::ServiceResult;
use crate::store::ImportSummary;
use crate::AppState;

type Envelope<T> = ServiceResult<Json<ApiResponse<T>>>;

/// POST /flashcards
pub async fn create_flashcard(
    State(state): State<AppState>,
    payload: Result<Json<CreateFlashcardRequest>, JsonRejection>,
) -> Envelope<Flashcard> {
    let Json(request) = payload?;
    let card = state
        .flashcards
        .create(&request.word, request.target_language.as_deref())
        .await?;
    Ok(Json(ApiResponse::ok_with_message(card, "Flashcard created successfully")))
}

/// GET /flashcards
pub async fn list_flashcards(State(state): State<AppState>) -> Envelope<Vec<Flashcard>> {
    Ok(Json(ApiResponse::ok(state.flashcards.list().await)))
}

/// GET /flashcards/:word
pub async fn get_flashcard(
    State(state): State<AppState>,
    Path(word): Path<String>,
) -> Envelope<Flashcard> {
    Ok(Json(ApiResponse::ok(state.flashcards.get(&word).await?)))
}

/// PUT /flashcards/:word
pub async fn update_flashcard(
    State(state): State<AppState>,
    Path(word): Path<String>,
    payload: Result<Json<FlashcardUpdate>, JsonRejection>,
) -> Envelope<Flashcard> {
    let Json(update) = payload?;
    let card = state.flashcards.update(&word, &update).await?;
    Ok(Json(ApiResponse::ok_with_message(card, "Flashcard updated successfully")))
}

/// DELETE /flashcards/:word
pub async fn delete_flashcard(
    State(state): State<AppState>,
    Path(word): Path<String>,
) -> Envelope<()> {
    state.flashcards.delete(&word).await?;
    Ok(Json(ApiResponse::message("Flashcard deleted successfully")))
}

/// PUT /flashcards/:word/learned?is_learned=bool
pub async fn set_learned(
    State(state): State<AppState>,
    Path(word): Path<String>,
    query: Result<Query<LearnedQuery>, QueryRejection>,
) -> Envelope<Flashcard> {
    let Query(query) = query?;
    let card = state.flashcards.set_learned(&word, query.is_learned).await?;
    let message = if query.is_learned {
        "Flashcard marked as learned"
    } else {
        "Flashcard marked as not learned"
    };
    Ok(Json(ApiResponse::ok_with_message(card, message)))
}

/// GET /flashcards/export
pub async fn export_flashcards(State(state): State<AppState>) -> Envelope<String> {
    Ok(Json(ApiResponse::ok(state.flashcards.export().await)))
}

/// POST /flashcards/import
pub async fn import_flashcards(
    State(state): State<AppState>,
    payload: Result<Json<ImportRequest>, JsonRejection>,
) -> Envelope<ImportSummary> {
    let Json(request) = payload?;
    let summary = state.flashcards.import(&request.text, request.dedupe).await?;
    let message = format!("Imported {} flashcard(s)", summary.imported);
    Ok(Json(ApiResponse::ok_with_message(summary, message)))
}

/// GET /flashcards/statistics
pub async fn statistics(State(state): State<AppState>) -> Envelope<LearningStatistics> {
    Ok(Json(ApiResponse::ok(state.flashcards.statistics().await)))
}

/// GET /flashcards/learned
pub async fn learned_flashcards(State(state): State<AppState>) -> Envelope<Vec<Flashcard>> {
    Ok(Json(ApiResponse::ok(state.flashcards.list_by_learned(true).await)))
}

/// GET /flashcards/unlearned
pub async fn unlearned_flashcards(State(state): State<AppState>) -> Envelope<Vec<Flashcard>> {
    Ok(Json(ApiResponse::ok(state.flashcards.list_by_learned(false).await)))
}

/// PUT and DELETE on a static segment act on the card whose word is that
/// segment, so cards named "learned" or "export" stay editable
fn with_card_methods(word: &'static str, route: MethodRouter<AppState>) -> MethodRouter<AppState> {
    route
        .put(
            move |state: State<AppState>, payload: Result<Json<FlashcardUpdate>, JsonRejection>| {
                update_flashcard(state, Path(word.to_string()), payload)
            },
        )
        .delete(move |state: State<AppState>| delete_flashcard(state, Path(word.to_string())))
}

/// Static segments take priority over `:word`
pub fn flashcard_routes() -> Router<AppState> {
    Router::new()
        .route("/flashcards", post(create_flashcard).get(list_flashcards))
        .route("/flashcards/export", with_card_methods("export", get(export_flashcards)))
        .route(
            "/flashcards/import",
            with_card_methods(
                "import",
                post(import_flashcards)
                    .get(|state: State<AppState>| get_flashcard(state, Path("import".to_string()))),
            ),
        )
        .route("/flashcards/statistics", with_card_methods("statistics", get(statistics)))
        .route("/flashcards/learned", with_card_methods("learned", get(learned_flashcards)))
        .route(
            "/flashcards/unlearned",
            with_card_methods("unlearned", get(unlearned_flashcards)),
        )
        .route(
            "/flashcards/:word",
            get(get_flashcard).put(update_flashcard).delete(delete_flashcard),
        )
        .route("/flashcards/:word/learned", put(set_learned))
}
