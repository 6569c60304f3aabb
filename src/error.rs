use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use formrelay_submission::SubmissionError;
use serde::Serialize;
use thiserror::Error;

use crate::email::DeliveryError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Unsupported content type: {0}")]
    UnsupportedContentType(String),

    #[error("Malformed request body: {0}")]
    MalformedBody(String),

    #[error("Request body too large: {0}")]
    PayloadTooLarge(String),

    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("Consent not approved")]
    ConsentRequired,

    #[error("Delivery failed: {0}")]
    Delivery(#[from] DeliveryError),

    #[error("Failed to compose email: {0}")]
    Compose(SubmissionError),
}

impl From<SubmissionError> for AppError {
    fn from(err: SubmissionError) -> Self {
        match err {
            SubmissionError::MissingFields(fields) => AppError::MissingFields(fields),
            SubmissionError::ConsentRequired => AppError::ConsentRequired,
            other => AppError::Compose(other),
        }
    }
}

/// JSON body of every response from the relay endpoint
#[derive(Serialize)]
pub struct MessageBody {
    pub message: String,
}

impl MessageBody {
    pub fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
        })
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status_code, message) = match &self {
            AppError::UnsupportedContentType(content_type) => {
                tracing::warn!(content_type = %content_type, "Rejected unsupported content type");
                (
                    StatusCode::UNSUPPORTED_MEDIA_TYPE,
                    "Unsupported Media Type".to_string(),
                )
            }
            AppError::MalformedBody(reason) => {
                tracing::warn!(reason = %reason, "Rejected malformed request body");
                (
                    StatusCode::BAD_REQUEST,
                    "Malformed request body".to_string(),
                )
            }
            AppError::PayloadTooLarge(reason) => {
                tracing::warn!(reason = %reason, "Rejected oversized request body");
                (
                    StatusCode::PAYLOAD_TOO_LARGE,
                    "Request body too large".to_string(),
                )
            }
            AppError::MissingFields(fields) => {
                tracing::warn!(missing = ?fields, "Rejected submission with missing fields");
                (
                    StatusCode::BAD_REQUEST,
                    "Missing required fields (formType, name, surname, email, message)".to_string(),
                )
            }
            AppError::ConsentRequired => {
                tracing::warn!("Rejected submission without KVKK approval");
                (
                    StatusCode::BAD_REQUEST,
                    "KVKK approval is required".to_string(),
                )
            }
            AppError::Delivery(e) => {
                tracing::error!(error = %e, "Error sending email");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Failed to send email: {}", e.category()),
                )
            }
            AppError::Compose(e) => {
                tracing::error!(error = %e, "Error composing email");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to send email: invalid message".to_string(),
                )
            }
        };

        (status_code, MessageBody::new(message)).into_response()
    }
}
