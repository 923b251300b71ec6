use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::booking::{Booking, BookingReceipt, NewBooking};
use crate::error::StoreError;
use crate::flight::{CityIndex, Flight, FlightQuery};
use crate::user::User;
use crate::wallet::Wallet;

/// Flight catalog access, including the per-flight booking-attempt log that
/// drives surge pricing. Attempts are stored as individual rows so that
/// appending is a single atomic insert and pruning a single delete; there is
/// no read-modify-write of an attempt list anywhere.
#[async_trait]
pub trait FlightStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Flight>, StoreError>;

    async fn search(&self, query: &FlightQuery) -> Result<Vec<Flight>, StoreError>;

    async fn distinct_cities(&self) -> Result<CityIndex, StoreError>;

    /// Attempt timestamps for one flight, oldest first.
    async fn attempts(&self, flight_id: Uuid) -> Result<Vec<DateTime<Utc>>, StoreError>;

    /// Deletes attempts strictly older than `cutoff`. Idempotent; returns
    /// the number removed.
    async fn prune_attempts(&self, flight_id: Uuid, cutoff: DateTime<Utc>) -> Result<u64, StoreError>;

    /// Atomically appends one attempt. `NotFound` if the flight vanished.
    async fn append_attempt(&self, flight_id: Uuid, at: DateTime<Utc>) -> Result<(), StoreError>;
}

#[async_trait]
pub trait WalletStore: Send + Sync {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<Wallet>, StoreError>;

    /// Atomically adds funds and appends the credit to the transaction log.
    /// Returns the new balance.
    async fn credit(&self, user_id: Uuid, amount: i64, description: &str) -> Result<i64, StoreError>;
}

#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn find_by_pnr(&self, pnr: &str) -> Result<Option<Booking>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>, StoreError>;

    /// All bookings for a user, newest first.
    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Booking>, StoreError>;

    /// The single commit boundary of a booking: persists the booking,
    /// debits the wallet (conditional on sufficient balance), appends the
    /// debit transaction, and records the booking attempt, all in one
    /// storage transaction. Either everything lands or nothing does.
    ///
    /// Fails with `PnrTaken` on a reservation-code collision (the unique
    /// constraint is the source of truth; callers regenerate and retry),
    /// `InsufficientFunds` when the conditional debit does not apply, and
    /// `NotFound` when the wallet is missing.
    async fn commit(
        &self,
        booking: &NewBooking,
        debit_description: &str,
    ) -> Result<BookingReceipt, StoreError>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Creates the user and their wallet (seeded with `starting_credit` and
    /// a matching credit transaction) in one storage transaction.
    async fn create(&self, email: &str, name: &str, starting_credit: i64) -> Result<User, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
}
