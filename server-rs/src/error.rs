use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::config::ConfigError;
use crate::models::FieldErrors;
use crate::services::{JoinError, NotificationError, PaymentError};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid form data.")]
    InvalidForm(FieldErrors),

    #[error("Invalid tier selected.")]
    InvalidTier,

    #[error("Payment is required to complete this application.")]
    PaymentRequired,

    #[error("{0}")]
    BadRequest(String),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Payment error: {0}")]
    Payment(#[from] PaymentError),

    #[error("Notification error: {0}")]
    Notification(#[from] NotificationError),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl From<JoinError> for AppError {
    fn from(err: JoinError) -> Self {
        match err {
            JoinError::Invalid(errors) => AppError::InvalidForm(errors),
            JoinError::UnknownTier(_) => AppError::InvalidTier,
            JoinError::PaymentRequired => AppError::PaymentRequired,
            JoinError::Configuration(e) => AppError::Configuration(e),
            JoinError::Payment(e) => AppError::Payment(e),
            JoinError::Notification(NotificationError::NotConfigured(e)) => {
                AppError::Configuration(e)
            }
            JoinError::Notification(e) => AppError::Notification(e),
        }
    }
}

/// `{ success: false, message }` with the given status.
pub fn failure(status: StatusCode, message: impl Into<String>) -> Response {
    let body = json!({ "success": false, "message": message.into() });
    (status, Json(body)).into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::InvalidForm(field_errors) => {
                let body = json!({
                    "success": false,
                    "message": "Invalid form data.",
                    "fieldErrors": field_errors,
                });
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
            AppError::InvalidTier | AppError::PaymentRequired | AppError::BadRequest(_) => {
                failure(StatusCode::BAD_REQUEST, self.to_string())
            }
            AppError::Configuration(e) => {
                tracing::error!("Configuration error: {e}");
                failure(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Service configuration error. Please contact support.",
                )
            }
            AppError::Payment(e) => {
                tracing::error!("Payment error: {e:?}");
                failure(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Your payment could not be confirmed. Please contact support.",
                )
            }
            AppError::Notification(e) => {
                tracing::error!("Notification error: {e}");
                failure(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Error sending confirmation emails.",
                )
            }
            AppError::Unexpected(msg) => {
                tracing::error!("Unexpected error: {msg}");
                failure(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred.",
                )
            }
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
