//! Handler errors and their JSON shape.
//!
//! Every failure renders as `{"error": message, "code": CODE}`, plus
//! `"fields"` for field-level validation. Rate-limit responses also carry
//! `Retry-After`.

use axum::http::header::RETRY_AFTER;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use quill_core::error::{CoreError, FieldErrors};
use quill_db::StoreError;
use serde::Serialize;

const INTERNAL_MESSAGE: &str = "An internal error occurred";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Core(core) => AppError::Core(core),
            StoreError::Database(db) => AppError::Database(db),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: String,
    code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<&'a FieldErrors>,
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        INTERNAL_MESSAGE.to_string(),
    )
}

fn core_parts(err: &CoreError) -> (StatusCode, &'static str, String) {
    match err {
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::FieldValidation(fields) => (
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            first_field_message(fields),
        ),
        CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
        CoreError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
        CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
        CoreError::RateLimited { retry_after_secs } => (
            StatusCode::TOO_MANY_REQUESTS,
            "RATE_LIMITED",
            format!("Too many requests, retry in {retry_after_secs}s"),
        ),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => core_parts(core),
            AppError::Database(err) => classify_sqlx_error(err),
        };

        let fields = match &self {
            AppError::Core(CoreError::FieldValidation(fields)) => Some(fields),
            _ => None,
        };
        let mut response = (
            status,
            Json(ErrorBody {
                error: message,
                code,
                fields,
            }),
        )
            .into_response();

        if let AppError::Core(CoreError::RateLimited { retry_after_secs }) = self {
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(retry_after_secs));
        }
        response
    }
}

/// `"<field>: <message>"` for the first reported field.
fn first_field_message(fields: &FieldErrors) -> String {
    fields
        .iter()
        .find_map(|(name, messages)| messages.first().map(|m| format!("{name}: {m}")))
        .unwrap_or_else(|| "Validation failed".to_string())
}

/// Map sqlx failures that escaped the store. `RowNotFound` is 404, a unique
/// violation on a `uq_` constraint is 409, anything else is a sanitized 500.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    if let sqlx::Error::RowNotFound = err {
        return (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        );
    }
    if let sqlx::Error::Database(db) = err {
        if db.code().as_deref() == Some("23505") {
            if let Some(constraint) = db.constraint().filter(|c| c.starts_with("uq_")) {
                return (
                    StatusCode::CONFLICT,
                    "CONFLICT",
                    format!("Duplicate value violates {constraint}"),
                );
            }
        }
    }
    tracing::error!(error = %err, "Database error");
    internal()
}
