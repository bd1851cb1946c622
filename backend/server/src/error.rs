use axum::{
    Json,
    extract::{multipart::MultipartRejection, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use ledger::LedgerError;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid {key} value: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("{0}")]
    NotFound(String),

    #[error("No tickets available for draw")]
    NoTickets,

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("Failed to render QR code: {0}")]
    Qr(#[from] qrcode::types::QrError),

    #[error("Failed to encode image: {0}")]
    Image(#[from] image::ImageError),

    #[error("Internal error: {0}")]
    InternalError(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingFields(_)
            | AppError::MalformedPayload(_)
            | AppError::BadRequest(_)
            | AppError::NoTickets => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Ledger(
                LedgerError::TicketCapacity { .. } | LedgerError::TicketExhausted { .. },
            ) => StatusCode::CONFLICT,
            AppError::Ledger(_)
            | AppError::Qr(_)
            | AppError::Image(_)
            | AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl AppError {
    /// Body errors keep 413 when a size limit was hit, anything else is a malformed payload.
    pub fn from_body(status: StatusCode, text: String) -> Self {
        if status == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge(text)
        } else {
            AppError::MalformedPayload(text)
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::from_body(rejection.status(), rejection.body_text())
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        AppError::from_body(rejection.status(), rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            error!("{self}");
        } else {
            warn!("{self}");
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_message() {
        let err = AppError::MissingFields(vec!["prize", "ticketCost"]);

        assert_eq!(err.to_string(), "Missing required fields: prize, ticketCost");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_capacity_is_conflict() {
        let err = AppError::from(LedgerError::TicketCapacity {
            requested: 5,
            available: 1,
        });

        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_store_failure_is_internal() {
        assert_eq!(
            AppError::from(LedgerError::Poisoned).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_body_limit_keeps_status() {
        let err = AppError::from_body(StatusCode::PAYLOAD_TOO_LARGE, "too big".to_string());
        assert_eq!(err.status(), StatusCode::PAYLOAD_TOO_LARGE);

        let err = AppError::from_body(StatusCode::BAD_REQUEST, "bad boundary".to_string());
        assert!(matches!(err, AppError::MalformedPayload(_)));
    }
}
