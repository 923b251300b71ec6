//! HashMap-backed store used by tests and local development.
//!
//! A single mutex over all state makes every operation atomic, including
//! the multi-record booking commit, mirroring what the Postgres
//! implementation achieves with a transaction.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::booking::{Booking, BookingReceipt, BookingStatus, NewBooking};
use crate::error::StoreError;
use crate::flight::{CityIndex, Flight, FlightQuery, FlightSortKey, SortOrder, SEARCH_LIMIT};
use crate::store::{BookingStore, FlightStore, UserStore, WalletStore};
use crate::user::User;
use crate::wallet::{TransactionKind, Wallet, WalletTransaction};

#[derive(Default)]
struct Inner {
    flights: HashMap<Uuid, Flight>,
    attempts: HashMap<Uuid, Vec<DateTime<Utc>>>,
    users: HashMap<Uuid, User>,
    /// Keyed by user id (1:1).
    wallets: HashMap<Uuid, Wallet>,
    bookings: Vec<Booking>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_flight(&self, flight: Flight) {
        let mut inner = self.inner.lock().await;
        inner.attempts.entry(flight.id).or_default();
        inner.flights.insert(flight.id, flight);
    }
}

#[async_trait]
impl FlightStore for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Flight>, StoreError> {
        Ok(self.inner.lock().await.flights.get(&id).cloned())
    }

    async fn search(&self, query: &FlightQuery) -> Result<Vec<Flight>, StoreError> {
        let inner = self.inner.lock().await;
        let mut matches: Vec<Flight> = inner
            .flights
            .values()
            .filter(|f| {
                let dep_ok = query.departure_city.as_deref().map_or(true, |c| {
                    f.departure_city.to_lowercase().contains(&c.to_lowercase())
                });
                let arr_ok = query.arrival_city.as_deref().map_or(true, |c| {
                    f.arrival_city.to_lowercase().contains(&c.to_lowercase())
                });
                dep_ok && arr_ok
            })
            .cloned()
            .collect();

        matches.sort_by(|a, b| {
            let ord = match query.sort_by {
                FlightSortKey::BasePrice => a.base_price.cmp(&b.base_price),
                FlightSortKey::Airline => a.airline.cmp(&b.airline),
                FlightSortKey::DepartureCity => a.departure_city.cmp(&b.departure_city),
                FlightSortKey::ArrivalCity => a.arrival_city.cmp(&b.arrival_city),
            };
            match query.sort_order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            }
        });
        matches.truncate(SEARCH_LIMIT);
        Ok(matches)
    }

    async fn distinct_cities(&self) -> Result<CityIndex, StoreError> {
        let inner = self.inner.lock().await;
        let mut departure_cities: Vec<String> =
            inner.flights.values().map(|f| f.departure_city.clone()).collect();
        let mut arrival_cities: Vec<String> =
            inner.flights.values().map(|f| f.arrival_city.clone()).collect();
        departure_cities.sort();
        departure_cities.dedup();
        arrival_cities.sort();
        arrival_cities.dedup();
        Ok(CityIndex { departure_cities, arrival_cities })
    }

    async fn attempts(&self, flight_id: Uuid) -> Result<Vec<DateTime<Utc>>, StoreError> {
        let inner = self.inner.lock().await;
        let mut attempts = inner.attempts.get(&flight_id).cloned().unwrap_or_default();
        attempts.sort();
        Ok(attempts)
    }

    async fn prune_attempts(&self, flight_id: Uuid, cutoff: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut inner = self.inner.lock().await;
        let Some(attempts) = inner.attempts.get_mut(&flight_id) else {
            return Ok(0);
        };
        let before = attempts.len();
        attempts.retain(|at| *at >= cutoff);
        Ok((before - attempts.len()) as u64)
    }

    async fn append_attempt(&self, flight_id: Uuid, at: DateTime<Utc>) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        if !inner.flights.contains_key(&flight_id) {
            return Err(StoreError::NotFound("flight"));
        }
        inner.attempts.entry(flight_id).or_default().push(at);
        Ok(())
    }
}

#[async_trait]
impl WalletStore for MemoryStore {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<Wallet>, StoreError> {
        Ok(self.inner.lock().await.wallets.get(&user_id).cloned())
    }

    async fn credit(&self, user_id: Uuid, amount: i64, description: &str) -> Result<i64, StoreError> {
        let mut inner = self.inner.lock().await;
        let wallet = inner.wallets.get_mut(&user_id).ok_or(StoreError::NotFound("wallet"))?;
        wallet.balance += amount;
        wallet.transactions.push(WalletTransaction {
            kind: TransactionKind::Credit,
            amount,
            description: description.to_string(),
            timestamp: Utc::now(),
        });
        Ok(wallet.balance)
    }
}

#[async_trait]
impl BookingStore for MemoryStore {
    async fn find_by_pnr(&self, pnr: &str) -> Result<Option<Booking>, StoreError> {
        Ok(self.inner.lock().await.bookings.iter().find(|b| b.pnr == pnr).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>, StoreError> {
        Ok(self.inner.lock().await.bookings.iter().find(|b| b.id == id).cloned())
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Booking>, StoreError> {
        let inner = self.inner.lock().await;
        let mut bookings: Vec<Booking> =
            inner.bookings.iter().filter(|b| b.user_id == user_id).cloned().collect();
        bookings.sort_by(|a, b| b.booking_date.cmp(&a.booking_date));
        Ok(bookings)
    }

    async fn commit(
        &self,
        new: &NewBooking,
        debit_description: &str,
    ) -> Result<BookingReceipt, StoreError> {
        let mut inner = self.inner.lock().await;
        let now = Utc::now();

        if inner.bookings.iter().any(|b| b.pnr == new.pnr) {
            return Err(StoreError::PnrTaken);
        }
        if !inner.flights.contains_key(&new.flight_id) {
            return Err(StoreError::NotFound("flight"));
        }

        let wallet_balance = {
            let wallet = inner
                .wallets
                .get_mut(&new.user_id)
                .ok_or(StoreError::NotFound("wallet"))?;
            if wallet.balance < new.final_price {
                return Err(StoreError::InsufficientFunds {
                    required: new.final_price,
                    available: wallet.balance,
                });
            }
            wallet.balance -= new.final_price;
            wallet.transactions.push(WalletTransaction {
                kind: TransactionKind::Debit,
                amount: new.final_price,
                description: debit_description.to_string(),
                timestamp: now,
            });
            wallet.balance
        };

        let booking = Booking {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            flight_id: new.flight_id,
            passenger_name: new.passenger_name.clone(),
            pnr: new.pnr.clone(),
            final_price: new.final_price,
            status: BookingStatus::Confirmed,
            flight_details: new.flight_details.clone(),
            booking_date: now,
        };
        inner.bookings.push(booking.clone());
        inner.attempts.entry(new.flight_id).or_default().push(now);

        Ok(BookingReceipt { booking, wallet_balance })
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(&self, email: &str, name: &str, starting_credit: i64) -> Result<User, StoreError> {
        let mut inner = self.inner.lock().await;
        if inner.users.values().any(|u| u.email == email) {
            return Err(StoreError::EmailTaken);
        }
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            name: name.to_string(),
            created_at: now,
        };
        inner.users.insert(user.id, user.clone());
        inner.wallets.insert(
            user.id,
            Wallet {
                id: Uuid::new_v4(),
                user_id: user.id,
                balance: starting_credit,
                transactions: vec![WalletTransaction {
                    kind: TransactionKind::Credit,
                    amount: starting_credit,
                    description: "Initial wallet balance".to_string(),
                    timestamp: now,
                }],
            },
        );
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.inner.lock().await.users.values().find(|u| u.email == email).cloned())
    }
}
