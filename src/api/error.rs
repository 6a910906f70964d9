use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt::Display;
use thiserror::Error;
use tracing::{error, warn};

use crate::models::{InvalidDocumentId, MissingEmail};

/// Failure of a single request. Nothing here outlives the request that
/// produced it.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{message}")]
    Internal {
        message: &'static str,
        cause: anyhow::Error,
    },
}

impl ApiError {
    /// Wrap an upstream failure; the cause is logged, the client only sees
    /// `message`.
    pub fn internal<E>(message: &'static str) -> impl FnOnce(E) -> Self
    where
        E: Into<anyhow::Error>,
    {
        move |cause| Self::Internal {
            message,
            cause: cause.into(),
        }
    }

    /// A failed write reported to the client as a bad request.
    pub fn rejected<E: Display>(message: &'static str) -> impl FnOnce(E) -> Self {
        move |cause| {
            warn!("{}: {}", message, cause);
            Self::Validation(message.to_string())
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<MissingEmail> for ApiError {
    fn from(err: MissingEmail) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl From<InvalidDocumentId> for ApiError {
    fn from(err: InvalidDocumentId) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal { message, cause } = &self {
            error!("{}: {:#}", message, cause);
        }

        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}
