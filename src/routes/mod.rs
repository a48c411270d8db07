pub mod health;
pub mod quiz;

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    let quiz_api = Router::new()
        .route("/api/quiz/options", get(quiz::get_options))
        .route("/api/quiz/sessions", post(quiz::create_session))
        .route("/api/quiz/sessions/:id", get(quiz::get_session))
        .route("/api/quiz/sessions/:id/start", post(quiz::start_session))
        .route("/api/quiz/sessions/:id/navigate", post(quiz::navigate))
        .route(
            "/api/quiz/sessions/:id/answers/:index",
            put(quiz::save_answer),
        )
        .route("/api/quiz/sessions/:id/submit", post(quiz::submit))
        .route(
            "/api/quiz/sessions/:id/submit/retry",
            post(quiz::retry_submission),
        )
        .route("/api/quiz/sessions/:id/record", get(quiz::get_record));

    Router::new()
        .route("/health", get(health::health))
        .merge(quiz_api)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
