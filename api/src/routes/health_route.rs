use ai_llm_service::health_service::HealthStatus;
use axum::extract::State;
use serde::Serialize;

use crate::core::{app_state::AppState, http::response_envelope::ApiResponse};

#[derive(Serialize)]
pub struct HealthReport {
    /// Always `"ok"`: the process is up. Provider problems show in `providers`.
    pub status: &'static str,
    pub providers: Vec<HealthStatus>,
}

/// GET /health. Probes the model and embedding endpoints; never fails.
pub async fn health(State(state): State<AppState>) -> ApiResponse<HealthReport> {
    let providers = match &state.llm {
        Some(llm) => llm.health_all().await,
        None => Vec::new(),
    };
    ApiResponse::success(HealthReport {
        status: "ok",
        providers,
    })
}
