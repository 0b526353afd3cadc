use std::collections::BTreeMap;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Field name to messages, rendered as `{"errors": {...}}`.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("invalid input")]
    Validation(FieldErrors),
    #[error("authentication credentials were not provided or are invalid")]
    Unauthorized,
    #[error("{0}")]
    Forbidden(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.entry(field.to_string()).or_default().push(message.into());
        AppError::Validation(errors)
    }

    pub fn forbidden() -> Self {
        AppError::Forbidden("you do not have permission to perform this action".to_string())
    }
}

impl From<sea_orm::DbErr> for AppError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Internal(anyhow::Error::new(err))
    }
}

impl From<jiff::Error> for AppError {
    fn from(err: jiff::Error) -> Self {
        Self::Internal(anyhow::Error::new(err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::BadRequest(detail) => (StatusCode::BAD_REQUEST, json!({ "detail": detail })),
            AppError::Validation(errors) => (StatusCode::BAD_REQUEST, json!({ "errors": errors })),
            AppError::Unauthorized => {
                (StatusCode::UNAUTHORIZED, json!({ "detail": self.to_string() }))
            },
            AppError::Forbidden(detail) => (StatusCode::FORBIDDEN, json!({ "detail": detail })),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, json!({ "detail": self.to_string() })),
            AppError::Internal(err) => {
                tracing::error!(error = %err, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "detail": "internal server error" }))
            },
        };
        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
