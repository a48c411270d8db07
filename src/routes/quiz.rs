use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use uuid::Uuid;
use validator::Validate;

use crate::dto::quiz_dto::{CreateSessionRequest, NavigateRequest, SaveAnswerRequest, StartSessionRequest};
use crate::error::{Error, Result};
use crate::services::quiz_service::QuizService;
use crate::AppState;

/// Runs a service call on the blocking pool. Bank loads and workbook writes
/// touch the filesystem while a session lock is held.
async fn blocking<T, F>(service: &QuizService, f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(QuizService) -> Result<T> + Send + 'static,
{
    let service = service.clone();
    tokio::task::spawn_blocking(move || f(service))
        .await
        .map_err(|e| Error::Internal(format!("Quiz task failed: {}", e)))?
}

#[axum::debug_handler]
pub async fn get_options(State(state): State<AppState>) -> Result<Response> {
    let options = blocking(&state.quiz_service, |service| service.options()).await?;
    Ok(Json(options).into_response())
}

#[axum::debug_handler]
pub async fn create_session(
    State(state): State<AppState>,
    Json(req): Json<CreateSessionRequest>,
) -> Result<Response> {
    req.validate()?;
    let view = state
        .quiz_service
        .create_session(&req.candidate_name, &req.candidate_id)?;
    Ok((StatusCode::CREATED, Json(view)).into_response())
}

#[axum::debug_handler]
pub async fn get_session(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Response> {
    let view = blocking(&state.quiz_service, move |service| service.session(id)).await?;
    Ok(Json(view).into_response())
}

#[axum::debug_handler]
pub async fn start_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<StartSessionRequest>,
) -> Result<Response> {
    req.validate()?;
    let view = blocking(&state.quiz_service, move |service| service.start_session(id, &req)).await?;
    Ok(Json(view).into_response())
}

#[axum::debug_handler]
pub async fn navigate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<NavigateRequest>,
) -> Result<Response> {
    req.validate()?;
    let view = blocking(&state.quiz_service, move |service| service.navigate(id, req.delta)).await?;
    Ok(Json(view).into_response())
}

#[axum::debug_handler]
pub async fn save_answer(
    State(state): State<AppState>,
    Path((id, index)): Path<(Uuid, usize)>,
    Json(req): Json<SaveAnswerRequest>,
) -> Result<Response> {
    req.validate()?;
    let saved = blocking(&state.quiz_service, move |service| {
        service.save_answer(id, index, req.answer)
    })
    .await?;
    Ok(Json(saved).into_response())
}

#[axum::debug_handler]
pub async fn submit(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Response> {
    let receipt = blocking(&state.quiz_service, move |service| service.submit(id)).await?;
    Ok(Json(receipt).into_response())
}

#[axum::debug_handler]
pub async fn retry_submission(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response> {
    let receipt = blocking(&state.quiz_service, move |service| service.retry_archive(id)).await?;
    Ok(Json(receipt).into_response())
}

#[axum::debug_handler]
pub async fn get_record(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Response> {
    let record = blocking(&state.quiz_service, move |service| service.record(id)).await?;
    Ok(Json(record).into_response())
}
