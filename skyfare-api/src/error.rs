use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use skyfare_booking::BookingError;
use skyfare_core::StoreError;

#[derive(Debug)]
pub enum AppError {
    AuthenticationError(String),
    ValidationError(String),
    NotFoundError(String),
    ConflictError(String),
    InsufficientFunds { required: i64, available: i64 },
    InternalServerError(String),
    Anyhow(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::AuthenticationError(msg) => {
                (StatusCode::UNAUTHORIZED, json!({ "error": msg }))
            }
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            AppError::ConflictError(msg) => (StatusCode::CONFLICT, json!({ "error": msg })),
            AppError::InsufficientFunds { required, available } => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "Insufficient wallet balance",
                    "required": required,
                    "available": available,
                }),
            ),
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": "Internal Server Error" }))
            }
            AppError::Anyhow(err) => {
                tracing::error!("Internal Server Error: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": "Internal Server Error" }))
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => AppError::NotFoundError(format!("{what} not found")),
            StoreError::InsufficientFunds { required, available } => {
                AppError::InsufficientFunds { required, available }
            }
            StoreError::PnrTaken => {
                AppError::ConflictError("Reservation code conflict, please retry".to_string())
            }
            StoreError::EmailTaken => {
                AppError::ConflictError("Email already registered".to_string())
            }
            StoreError::Storage(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::FlightNotFound => AppError::NotFoundError("Flight not found".to_string()),
            BookingError::WalletNotFound => AppError::NotFoundError("Wallet not found".to_string()),
            BookingError::InsufficientFunds { required, available } => {
                AppError::InsufficientFunds { required, available }
            }
            BookingError::PnrExhausted => AppError::ConflictError(
                "Could not allocate a reservation code, please retry".to_string(),
            ),
            BookingError::Storage(inner) => inner.into(),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Anyhow(err)
    }
}
