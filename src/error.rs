use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::{db::StoreError, moderation::ModerationError};

pub const MODERATION_UNAVAILABLE_MSG: &str =
    "Content filtering service unavailable. Please try again later.";
pub const REJECTED_CONTENT_MSG: &str = "Your post contains inappropriate content or offensive \
     language. Please review and modify your content before posting.";

/// Discriminant sent to clients next to the message.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Conflict,
    Auth,
    Storage,
    Internal,
    ModerationUnavailable,
    RejectedContent,
}

/// Application error returned by handlers.
///
/// Only the message of client-facing variants reaches the response body;
/// storage and moderation failures are logged and replaced with a fixed text.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] JsonRejection),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Auth(String),
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
    #[error("moderation unavailable: {0}")]
    ModerationUnavailable(#[from] ModerationError),
    #[error("content rejected by moderation")]
    RejectedContent,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub kind: ErrorKind,
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) | Self::InvalidJson(_) => ErrorKind::Validation,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Auth(_) => ErrorKind::Auth,
            Self::Storage(_) => ErrorKind::Storage,
            Self::Internal(_) => ErrorKind::Internal,
            Self::ModerationUnavailable(_) => ErrorKind::ModerationUnavailable,
            Self::RejectedContent => ErrorKind::RejectedContent,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::InvalidJson(_) | Self::RejectedContent => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Auth(_) => StatusCode::UNAUTHORIZED,
            Self::Storage(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ModerationUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn public_message(&self) -> String {
        match self {
            Self::Validation(msg) | Self::Conflict(msg) | Self::Auth(msg) => msg.clone(),
            Self::InvalidJson(_) => "invalid JSON".into(),
            Self::Storage(_) | Self::Internal(_) => "internal server error".into(),
            Self::ModerationUnavailable(_) => MODERATION_UNAVAILABLE_MSG.into(),
            Self::RejectedContent => REJECTED_CONTENT_MSG.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, kind = ?self.kind(), "request failed");
        }
        let body = ErrorBody {
            error: self.public_message(),
            kind: self.kind(),
        };
        (status, Json(body)).into_response()
    }
}
