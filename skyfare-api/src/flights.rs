use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use uuid::Uuid;

use skyfare_core::flight::{CityIndex, Flight, FlightQuery};
use skyfare_pricing::PriceQuote;

use crate::error::AppError;
use crate::state::AppState;

/// A flight enriched with its live pricing verdict.
#[derive(Debug, Serialize)]
struct FlightView {
    id: Uuid,
    flight_code: String,
    airline: String,
    departure_city: String,
    arrival_city: String,
    departure_time: String,
    arrival_time: String,
    base_price: i64,
    current_price: i64,
    is_surge_active: bool,
    surge_percentage: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    time_until_reset_ms: Option<i64>,
}

impl FlightView {
    fn new(flight: Flight, quote: PriceQuote) -> Self {
        Self {
            id: flight.id,
            flight_code: flight.flight_code,
            airline: flight.airline,
            departure_city: flight.departure_city,
            arrival_city: flight.arrival_city,
            departure_time: flight.departure_time,
            arrival_time: flight.arrival_time,
            base_price: flight.base_price,
            current_price: quote.current_price,
            is_surge_active: quote.is_surge_active,
            surge_percentage: quote.surge_percentage,
            time_until_reset_ms: quote.time_until_reset_ms,
        }
    }
}

#[derive(Debug, Serialize)]
struct SearchResponse {
    flights: Vec<FlightView>,
    count: usize,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/flights", get(search_flights))
        .route("/v1/flights/cities", get(get_cities))
        .route("/v1/flights/{id}", get(get_flight))
}

async fn search_flights(
    State(state): State<AppState>,
    Query(query): Query<FlightQuery>,
) -> Result<Json<SearchResponse>, AppError> {
    let flights = state.flights.search(&query).await?;

    let mut views = Vec::with_capacity(flights.len());
    for flight in flights {
        let quote = state.pricing.quote(flight.id).await?;
        views.push(FlightView::new(flight, quote));
    }

    let count = views.len();
    Ok(Json(SearchResponse { flights: views, count }))
}

async fn get_flight(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<FlightView>, AppError> {
    let flight = state
        .flights
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("Flight not found".to_string()))?;

    let quote = state.pricing.quote(flight.id).await?;
    Ok(Json(FlightView::new(flight, quote)))
}

async fn get_cities(State(state): State<AppState>) -> Result<Json<CityIndex>, AppError> {
    Ok(Json(state.flights.distinct_cities().await?))
}
