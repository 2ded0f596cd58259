use axum::extract::{Path, State};
use tracing::instrument;

use assistant::SessionList;

use crate::core::{app_state::AppState, http::response_envelope::ApiResponse};
use crate::error_handler::AppResult;
use crate::routes::sessions::session_dto::{ClosedSession, CreatedSession, SessionTranscript};

/// POST /sessions
pub async fn create_session(State(state): State<AppState>) -> ApiResponse<CreatedSession> {
    let id = state.sessions.create().await;
    ApiResponse::success(CreatedSession { id })
}

/// GET /sessions
pub async fn list_sessions(State(state): State<AppState>) -> ApiResponse<SessionList> {
    ApiResponse::success(state.sessions.list().await)
}

/// GET /sessions/{id}
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<SessionTranscript>> {
    let transcript = state.sessions.transcript(&id).await?;
    Ok(ApiResponse::success(SessionTranscript { id, transcript }))
}

/// POST /sessions/{id}/select
pub async fn select_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<SessionList>> {
    state.sessions.select(&id).await?;
    Ok(ApiResponse::success(state.sessions.list().await))
}

/// DELETE /sessions/{id}
#[instrument(skip_all, fields(session = %id))]
pub async fn close_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<ClosedSession>> {
    state.sessions.close(&id).await?;
    Ok(ApiResponse::success(ClosedSession { closed: id }))
}
