use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

/// One rejected form field, reported back to the submitter.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    #[must_use]
    pub const fn new(field: &'static str, message: String) -> Self {
        Self { field, message }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation failed for {} field(s)", .0.len())]
    Validation(Vec<FieldError>),
    #[error("Rate limit exceeded")]
    RateLimited,
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::Validation(fields) => {
                let body = Json(json!({
                    "error": "Validation failed",
                    "fields": fields,
                }));
                (StatusCode::BAD_REQUEST, body).into_response()
            }
            Self::RateLimited => {
                let body = Json(json!({
                    "error": "Too many submissions, please try again later",
                }));
                (StatusCode::TOO_MANY_REQUESTS, body).into_response()
            }
            Self::Database(e) => {
                tracing::error!(error = %e, "Database error");
                let body = Json(json!({
                    "error": "Failed to submit RSVP. Please try again.",
                }));
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
        }
    }
}
