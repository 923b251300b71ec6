use std::sync::Arc;

use uuid::Uuid;

use skyfare_core::booking::{BookingReceipt, NewBooking};
use skyfare_core::pnr;
use skyfare_core::store::{BookingStore, FlightStore, WalletStore};
use skyfare_core::StoreError;
use skyfare_pricing::PricingService;

/// Attempts before a reservation-code conflict is surfaced to the caller.
/// At 36^6 codes, hitting this means something other than bad luck.
const MAX_PNR_ATTEMPTS: usize = 5;

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("flight not found")]
    FlightNotFound,

    #[error("wallet not found")]
    WalletNotFound,

    #[error("insufficient wallet balance: required {required}, available {available}")]
    InsufficientFunds { required: i64, available: i64 },

    #[error("could not allocate a unique reservation code")]
    PnrExhausted,

    #[error(transparent)]
    Storage(StoreError),
}

impl From<StoreError> for BookingError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound("flight") => BookingError::FlightNotFound,
            StoreError::NotFound("wallet") => BookingError::WalletNotFound,
            StoreError::InsufficientFunds { required, available } => {
                BookingError::InsufficientFunds { required, available }
            }
            other => BookingError::Storage(other),
        }
    }
}

/// Orchestrates a single booking: authoritative re-quote, wallet check,
/// reservation-code allocation, and the one-transaction commit of
/// booking + debit + attempt.
pub struct BookingCoordinator {
    flights: Arc<dyn FlightStore>,
    wallets: Arc<dyn WalletStore>,
    bookings: Arc<dyn BookingStore>,
    pricing: Arc<PricingService>,
    pnr_source: Box<dyn Fn() -> String + Send + Sync>,
}

impl BookingCoordinator {
    pub fn new(
        flights: Arc<dyn FlightStore>,
        wallets: Arc<dyn WalletStore>,
        bookings: Arc<dyn BookingStore>,
        pricing: Arc<PricingService>,
    ) -> Self {
        Self {
            flights,
            wallets,
            bookings,
            pricing,
            pnr_source: Box::new(pnr::generate),
        }
    }

    /// Swap the code generator. Tests use this to force collisions.
    pub fn with_pnr_source(mut self, source: impl Fn() -> String + Send + Sync + 'static) -> Self {
        self.pnr_source = Box::new(source);
        self
    }

    pub async fn create_booking(
        &self,
        user_id: Uuid,
        flight_id: Uuid,
        passenger_name: &str,
    ) -> Result<BookingReceipt, BookingError> {
        let flight = self
            .flights
            .find_by_id(flight_id)
            .await?
            .ok_or(BookingError::FlightNotFound)?;

        // Re-quote at booking time; never trust a client-supplied or
        // previously displayed price.
        let quote = self.pricing.quote(flight_id).await?;
        let price = quote.current_price;

        let wallet = self
            .wallets
            .find_by_user(user_id)
            .await?
            .ok_or(BookingError::WalletNotFound)?;
        if wallet.balance < price {
            return Err(BookingError::InsufficientFunds {
                required: price,
                available: wallet.balance,
            });
        }

        let description = format!(
            "Flight booking - {} ({} to {})",
            flight.flight_code, flight.departure_city, flight.arrival_city
        );

        for _ in 0..MAX_PNR_ATTEMPTS {
            let candidate = (self.pnr_source)();

            // Cheap pre-check; the unique constraint inside commit is the
            // actual source of truth under concurrency.
            if self.bookings.find_by_pnr(&candidate).await?.is_some() {
                continue;
            }

            let new_booking = NewBooking {
                user_id,
                flight_id,
                passenger_name: passenger_name.to_string(),
                pnr: candidate,
                final_price: price,
                flight_details: flight.details(),
            };

            match self.bookings.commit(&new_booking, &description).await {
                Ok(receipt) => {
                    tracing::info!(
                        pnr = %receipt.booking.pnr,
                        flight = %flight.flight_code,
                        price,
                        surge = quote.is_surge_active,
                        "booking confirmed"
                    );
                    return Ok(receipt);
                }
                Err(StoreError::PnrTaken) => {
                    tracing::warn!(flight = %flight.flight_code, "reservation code collision, regenerating");
                    continue;
                }
                Err(other) => return Err(other.into()),
            }
        }

        Err(BookingError::PnrExhausted)
    }
}
