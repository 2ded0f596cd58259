use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use tracing::{info, instrument};

use assistant::split_artifacts;

use crate::core::{app_state::AppState, http::response_envelope::ApiResponse};
use crate::error_handler::{AppError, AppResult};
use crate::routes::sessions::session_dto::{AskRequest, AskResponse};

/// POST /sessions/{id}/messages
///
/// Runs one turn. Turns on the same session wait for each other on the
/// session lock; a failed turn still answers 200 with the apology text.
#[instrument(skip_all, fields(session = %id))]
pub async fn post_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> AppResult<ApiResponse<AskResponse>> {
    let Json(req) = payload?;
    if req.question.trim().is_empty() {
        return Err(AppError::BadRequest("question must not be empty".into()));
    }

    let handle = state.sessions.get(&id).await?;
    let mut session = handle.lock().await;
    let result = state.assistant.respond(&mut session, &req.question).await;
    info!(
        chars = result.text.len(),
        context = result.context.len(),
        tools = result.tools.len(),
        failed = result.error.is_some(),
        "turn finished"
    );

    Ok(ApiResponse::success(AskResponse {
        segments: split_artifacts(&result.text),
        answer: result.text,
        context: result.context,
        tools: result.tools,
    }))
}
