//! Error types for the session API.
//!
//! [`ApiError`] converts every failure into a JSON body of the form
//! `{"error": ..., "message": ..., "status": ...}` through its
//! [`IntoResponse`](axum::response::IntoResponse) implementation. The
//! `message` field carries the same player-facing text the session
//! records as a notification.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tycoon_core::SessionError;
use tycoon_economy::{PurchaseError, WithdrawalError};

/// Errors that can occur in the API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A session operation was rejected.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A path parameter could not be parsed as a UUID.
    #[error("invalid UUID: {0}")]
    InvalidUuid(String),

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status for this error.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Session(err) => session_status(err),
            Self::InvalidUuid(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

const fn session_status(err: &SessionError) -> StatusCode {
    match err {
        SessionError::TaskNotFound(_) | SessionError::UnknownItem(_) => StatusCode::NOT_FOUND,
        SessionError::InsufficientEnergy { .. }
        | SessionError::DailyLimitReached { .. }
        | SessionError::NoActiveTask
        | SessionError::StaleTask
        | SessionError::VerificationInProgress
        | SessionError::Purchase(PurchaseError::InsufficientFunds { .. })
        | SessionError::Withdrawal(WithdrawalError::InsufficientFunds { .. }) => {
            StatusCode::CONFLICT
        }
        SessionError::EmptyAnswer
        | SessionError::Withdrawal(
            WithdrawalError::InvalidAmount { .. } | WithdrawalError::MissingAccount,
        ) => StatusCode::UNPROCESSABLE_ENTITY,
        SessionError::Economy(_)
        | SessionError::Purchase(PurchaseError::Economy(_))
        | SessionError::Withdrawal(WithdrawalError::Economy(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::Session(err) => err.user_message(),
            Self::InvalidUuid(_) => "That id is not valid.".to_owned(),
            Self::Internal(_) => "Something went wrong. Please try again.".to_owned(),
        };

        let body = serde_json::json!({
            "error": self.to_string(),
            "message": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
