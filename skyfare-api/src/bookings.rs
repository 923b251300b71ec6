use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use skyfare_core::booking::Booking;

use crate::error::AppError;
use crate::middleware::auth::Claims;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct CreateBookingRequest {
    flight_id: Uuid,
    passenger_name: String,
}

#[derive(Debug, Serialize)]
struct CreateBookingResponse {
    message: String,
    booking: Booking,
    wallet_balance: i64,
}

#[derive(Debug, Serialize)]
struct BookingHistoryResponse {
    bookings: Vec<Booking>,
    count: usize,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/bookings", post(create_booking).get(booking_history))
        .route("/v1/bookings/{id}", get(get_booking))
}

async fn create_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<CreateBookingResponse>), AppError> {
    let user_id = claims.user_id()?;
    let passenger_name = req.passenger_name.trim();
    if passenger_name.is_empty() {
        return Err(AppError::ValidationError("Passenger name is required".to_string()));
    }

    let receipt = state
        .coordinator
        .create_booking(user_id, req.flight_id, passenger_name)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateBookingResponse {
            message: "Booking successful".to_string(),
            booking: receipt.booking,
            wallet_balance: receipt.wallet_balance,
        }),
    ))
}

async fn booking_history(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<BookingHistoryResponse>, AppError> {
    let user_id = claims.user_id()?;
    let bookings = state.bookings.find_by_user(user_id).await?;
    let count = bookings.len();
    Ok(Json(BookingHistoryResponse { bookings, count }))
}

async fn get_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<Booking>, AppError> {
    let user_id = claims.user_id()?;
    let booking = state
        .bookings
        .find_by_id(id)
        .await?
        // Other users' bookings are indistinguishable from absent ones.
        .filter(|b| b.user_id == user_id)
        .ok_or_else(|| AppError::NotFoundError("Booking not found".to_string()))?;
    Ok(Json(booking))
}
