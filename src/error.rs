use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Question bank error: {0}")]
    Load(String),

    #[error("No questions match the selected topics and difficulty")]
    EmptySelection,

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Submission error: {0}")]
    Submission(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    fn code(&self) -> &'static str {
        match self {
            Error::Config(_) => "config_error",
            Error::Load(_) => "question_bank_unavailable",
            Error::EmptySelection => "empty_selection",
            Error::InvalidTransition(_) => "invalid_transition",
            Error::Submission(_) => "submission_failed",
            Error::BadRequest(_) => "bad_request",
            Error::NotFound(_) => "not_found",
            Error::Validation(_) => "validation_error",
            Error::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            Error::BadRequest(_) | Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::InvalidTransition(_) => StatusCode::CONFLICT,
            Error::EmptySelection => StatusCode::UNPROCESSABLE_ENTITY,
            Error::Load(_) => StatusCode::SERVICE_UNAVAILABLE,
            Error::Submission(_) | Error::Config(_) | Error::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = Json(json!({ "error": self.code(), "message": self.to_string() }));
        (status, body).into_response()
    }
}
