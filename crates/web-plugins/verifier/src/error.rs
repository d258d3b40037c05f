use crate::{
    builder::BuildError, signals::SignalError, validator::ValidationError,
    verification::VerificationError,
};
use axum::{http::StatusCode, response::IntoResponse, Json};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error("Malformed request. {0}")]
    MalformedRequest(String),

    #[error("sessionID not found")]
    SessionNotFound,

    #[error("Error getting QRCode: item {0} not found")]
    QrCodeNotFound(Uuid),

    #[error("sessionID not found")]
    UnknownCallbackSession,

    #[error("session is no longer pending")]
    SessionNotPending,

    #[error("session does not hold an authorization request")]
    NotAnAuthorizationRequest,

    #[error(transparent)]
    Verification(#[from] VerificationError),

    #[error(transparent)]
    Signals(#[from] SignalError),
}

impl SessionError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            SessionError::Validation(_)
            | SessionError::Build(_)
            | SessionError::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            SessionError::SessionNotFound => StatusCode::NOT_FOUND,
            SessionError::QrCodeNotFound(_)
            | SessionError::UnknownCallbackSession
            | SessionError::SessionNotPending
            | SessionError::NotAnAuthorizationRequest
            | SessionError::Verification(_)
            | SessionError::Signals(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for SessionError {
    fn into_response(self) -> axum::response::Response {
        let status_code = self.status_code();

        let body = Json(serde_json::json!({
            "message": self.to_string(),
        }));

        (status_code, body).into_response()
    }
}
