use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use skyfare_core::booking::{Booking, BookingReceipt, BookingStatus, NewBooking};
use skyfare_core::flight::FlightDetails;
use skyfare_core::store::BookingStore;
use skyfare_core::wallet::TransactionKind;
use skyfare_core::StoreError;

use crate::store_error;

pub struct PostgresBookingStore {
    pool: PgPool,
}

impl PostgresBookingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    user_id: Uuid,
    flight_id: Uuid,
    passenger_name: String,
    pnr: String,
    final_price: i64,
    status: String,
    flight_code: String,
    airline: String,
    departure_city: String,
    arrival_city: String,
    departure_time: String,
    arrival_time: String,
    booking_date: DateTime<Utc>,
}

impl From<BookingRow> for Booking {
    fn from(row: BookingRow) -> Self {
        Booking {
            id: row.id,
            user_id: row.user_id,
            flight_id: row.flight_id,
            passenger_name: row.passenger_name,
            pnr: row.pnr,
            final_price: row.final_price,
            status: if row.status == "cancelled" {
                BookingStatus::Cancelled
            } else {
                BookingStatus::Confirmed
            },
            flight_details: FlightDetails {
                flight_code: row.flight_code,
                airline: row.airline,
                departure_city: row.departure_city,
                arrival_city: row.arrival_city,
                departure_time: row.departure_time,
                arrival_time: row.arrival_time,
            },
            booking_date: row.booking_date,
        }
    }
}

const BOOKING_COLUMNS: &str = "id, user_id, flight_id, passenger_name, pnr, final_price, status, flight_code, airline, departure_city, arrival_city, departure_time, arrival_time, booking_date";

#[async_trait]
impl BookingStore for PostgresBookingStore {
    async fn find_by_pnr(&self, pnr: &str) -> Result<Option<Booking>, StoreError> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE pnr = $1"
        ))
        .bind(pnr)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;
        Ok(row.map(Booking::from))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>, StoreError> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;
        Ok(row.map(Booking::from))
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Booking>, StoreError> {
        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE user_id = $1 ORDER BY booking_date DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;
        Ok(rows.into_iter().map(Booking::from).collect())
    }

    async fn commit(
        &self,
        new: &NewBooking,
        debit_description: &str,
    ) -> Result<BookingReceipt, StoreError> {
        let mut tx = self.pool.begin().await.map_err(store_error)?;
        let now = Utc::now();
        let booking_id = Uuid::new_v4();

        // Conditional decrement: the balance check and the debit are one
        // statement, so two concurrent bookings cannot both pass a stale
        // sufficiency check and overdraw.
        let debited = sqlx::query_as::<_, (Uuid, i64)>(
            "UPDATE wallets SET balance = balance - $2 WHERE user_id = $1 AND balance >= $2 RETURNING id, balance",
        )
        .bind(new.user_id)
        .bind(new.final_price)
        .fetch_optional(&mut *tx)
        .await
        .map_err(store_error)?;

        let (wallet_id, wallet_balance) = match debited {
            Some(row) => row,
            None => {
                // Distinguish a missing wallet from a short one.
                let available: Option<i64> =
                    sqlx::query_scalar("SELECT balance FROM wallets WHERE user_id = $1")
                        .bind(new.user_id)
                        .fetch_optional(&mut *tx)
                        .await
                        .map_err(store_error)?;
                return Err(match available {
                    Some(available) => StoreError::InsufficientFunds {
                        required: new.final_price,
                        available,
                    },
                    None => StoreError::NotFound("wallet"),
                });
            }
        };

        // The unique index on pnr turns a lost race in the coordinator's
        // pre-check into a PnrTaken here, aborting the whole transaction.
        sqlx::query(&format!(
            "INSERT INTO bookings ({BOOKING_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)"
        ))
        .bind(booking_id)
        .bind(new.user_id)
        .bind(new.flight_id)
        .bind(&new.passenger_name)
        .bind(&new.pnr)
        .bind(new.final_price)
        .bind(BookingStatus::Confirmed.as_str())
        .bind(&new.flight_details.flight_code)
        .bind(&new.flight_details.airline)
        .bind(&new.flight_details.departure_city)
        .bind(&new.flight_details.arrival_city)
        .bind(&new.flight_details.departure_time)
        .bind(&new.flight_details.arrival_time)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(store_error)?;

        sqlx::query(
            "INSERT INTO wallet_transactions (wallet_id, kind, amount, description, created_at) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(wallet_id)
        .bind(TransactionKind::Debit.as_str())
        .bind(new.final_price)
        .bind(debit_description)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(store_error)?;

        sqlx::query("INSERT INTO booking_attempts (flight_id, attempted_at) VALUES ($1, $2)")
            .bind(new.flight_id)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(store_error)?;

        tx.commit().await.map_err(store_error)?;

        Ok(BookingReceipt {
            booking: Booking {
                id: booking_id,
                user_id: new.user_id,
                flight_id: new.flight_id,
                passenger_name: new.passenger_name.clone(),
                pnr: new.pnr.clone(),
                final_price: new.final_price,
                status: BookingStatus::Confirmed,
                flight_details: new.flight_details.clone(),
                booking_date: now,
            },
            wallet_balance,
        })
    }
}
