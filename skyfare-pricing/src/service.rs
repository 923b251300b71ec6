use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use skyfare_core::store::FlightStore;
use skyfare_core::StoreError;

use crate::window::{SlidingWindow, WindowConfig};

/// Pricing verdict for one flight at one instant.
#[derive(Debug, Clone, Serialize)]
pub struct PriceQuote {
    pub current_price: i64,
    pub is_surge_active: bool,
    pub surge_percentage: u32,
    /// Milliseconds until surge decays. Present only while surge is active.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_until_reset_ms: Option<i64>,
}

/// The surge-pricing engine over the flight catalog's attempt log.
///
/// Quoting is not a pure read: each quote also prunes attempts that have
/// aged out of the retention window, so the stored log stays bounded.
pub struct PricingService {
    flights: Arc<dyn FlightStore>,
    window: SlidingWindow,
}

impl PricingService {
    pub fn new(flights: Arc<dyn FlightStore>, config: WindowConfig) -> Self {
        Self { flights, window: SlidingWindow::new(config) }
    }

    pub fn window(&self) -> &SlidingWindow {
        &self.window
    }

    pub async fn quote(&self, flight_id: Uuid) -> Result<PriceQuote, StoreError> {
        self.quote_at(flight_id, Utc::now()).await
    }

    /// Quote against an explicit instant. Time is a parameter so the window
    /// arithmetic is testable without waiting out real minutes.
    pub async fn quote_at(&self, flight_id: Uuid, now: DateTime<Utc>) -> Result<PriceQuote, StoreError> {
        let flight = self
            .flights
            .find_by_id(flight_id)
            .await?
            .ok_or(StoreError::NotFound("flight"))?;

        let pruned = self
            .flights
            .prune_attempts(flight_id, self.window.retention_cutoff(now))
            .await?;
        if pruned > 0 {
            tracing::debug!(%flight_id, pruned, "pruned stale booking attempts");
        }

        let attempts = self.flights.attempts(flight_id).await?;
        let state = self.window.evaluate(&attempts, now);

        Ok(PriceQuote {
            current_price: self.window.price(flight.base_price, state.surge_active),
            is_surge_active: state.surge_active,
            surge_percentage: if state.surge_active {
                self.window.config().surge_percentage
            } else {
                0
            },
            time_until_reset_ms: state.time_until_reset.map(|d| d.num_milliseconds()),
        })
    }

    /// Appends one attempt timestamp for the flight. Called once per
    /// completed booking; failed bookings never reach this.
    pub async fn record_attempt(&self, flight_id: Uuid) -> Result<(), StoreError> {
        self.flights.append_attempt(flight_id, Utc::now()).await
    }
}
