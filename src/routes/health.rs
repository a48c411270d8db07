use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::config::ExpiryPolicy;
use crate::AppState;

#[axum::debug_handler]
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let settings = state.quiz_service.settings();
    let body = json!({
        "status": "ok",
        "quiz_duration_seconds": settings.duration_seconds,
        "question_count": settings.question_count,
        "auto_submit": settings.expiry_policy == ExpiryPolicy::AutoSubmit,
    });
    (StatusCode::OK, Json(body))
}
