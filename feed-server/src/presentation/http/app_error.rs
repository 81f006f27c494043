use std::collections::BTreeMap;

use crate::domain::error::DomainError;
use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("validation error: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("unauthorized")]
    Unauthorized,
}

pub(crate) type AppResult<T> = Result<T, AppError>;

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<FieldErrors>,
}

impl AppError {
    fn parts(self) -> (StatusCode, String, Option<FieldErrors>) {
        match self {
            AppError::Domain(err) => match err {
                DomainError::Validation { field, message } => (
                    StatusCode::BAD_REQUEST,
                    "validation failed".to_string(),
                    Some(BTreeMap::from([(field.to_string(), vec![message.to_string()])])),
                ),
                DomainError::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string(), None),
                DomainError::RateLimited => {
                    (StatusCode::TOO_MANY_REQUESTS, err.to_string(), None)
                }
                DomainError::AuthorNotFound(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Author not found".to_string(),
                    None,
                ),
                DomainError::Unexpected(ref detail) => {
                    error!(error = %detail, "request failed");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "internal error".to_string(),
                        None,
                    )
                }
            },
            AppError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                "validation failed".to_string(),
                Some(field_errors(&errors)),
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized".to_string(), None),
        }
    }
}

fn field_errors(errors: &ValidationErrors) -> FieldErrors {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let messages = errs
                .iter()
                .map(|err| {
                    err.message
                        .as_ref()
                        .map(|msg| msg.to_string())
                        .unwrap_or_else(|| err.code.to_string())
                })
                .collect();
            (field.to_string(), messages)
        })
        .collect()
}

fn error_code(status: StatusCode) -> &'static str {
    match status {
        StatusCode::BAD_REQUEST => "BAD_REQUEST",
        StatusCode::UNAUTHORIZED => "UNAUTHORIZED",
        StatusCode::NOT_FOUND => "NOT_FOUND",
        StatusCode::TOO_MANY_REQUESTS => "TOO_MANY_REQUESTS",
        _ => "INTERNAL_SERVER_ERROR",
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, fields) = self.parts();
        let body = ErrorBody {
            error,
            code: error_code(status),
            fields,
        };

        (status, Json(body)).into_response()
    }
}
