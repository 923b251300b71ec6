use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum number of flights returned by a single search.
pub const SEARCH_LIMIT: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flight {
    pub id: Uuid,
    pub flight_code: String,
    pub airline: String,
    pub departure_city: String,
    pub arrival_city: String,
    /// Display strings only; never used for computation.
    pub departure_time: String,
    pub arrival_time: String,
    /// Fixed reference price. Seed data keeps this within 2000..=3000.
    pub base_price: i64,
}

impl Flight {
    /// Display fields denormalized onto a booking at commit time.
    pub fn details(&self) -> FlightDetails {
        FlightDetails {
            flight_code: self.flight_code.clone(),
            airline: self.airline.clone(),
            departure_city: self.departure_city.clone(),
            arrival_city: self.arrival_city.clone(),
            departure_time: self.departure_time.clone(),
            arrival_time: self.arrival_time.clone(),
        }
    }
}

/// Snapshot of a flight's display fields, decoupled from later flight edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightDetails {
    pub flight_code: String,
    pub airline: String,
    pub departure_city: String,
    pub arrival_city: String,
    pub departure_time: String,
    pub arrival_time: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FlightQuery {
    /// Case-insensitive substring match on departure city.
    pub departure_city: Option<String>,
    /// Case-insensitive substring match on arrival city.
    pub arrival_city: Option<String>,
    #[serde(default)]
    pub sort_by: FlightSortKey,
    #[serde(default)]
    pub sort_order: SortOrder,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlightSortKey {
    #[default]
    BasePrice,
    Airline,
    DepartureCity,
    ArrivalCity,
}

impl FlightSortKey {
    pub fn column(self) -> &'static str {
        match self {
            FlightSortKey::BasePrice => "base_price",
            FlightSortKey::Airline => "airline",
            FlightSortKey::DepartureCity => "departure_city",
            FlightSortKey::ArrivalCity => "arrival_city",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Distinct route endpoints, for the search form.
#[derive(Debug, Clone, Serialize)]
pub struct CityIndex {
    pub departure_cities: Vec<String>,
    pub arrival_cities: Vec<String>,
}
