pub mod app_config;
pub mod booking_repo;
pub mod database;
pub mod flight_repo;
pub mod user_repo;
pub mod wallet_repo;

pub use booking_repo::PostgresBookingStore;
pub use database::DbClient;
pub use flight_repo::PostgresFlightStore;
pub use user_repo::PostgresUserStore;
pub use wallet_repo::PostgresWalletStore;

use skyfare_core::StoreError;

/// Maps sqlx failures onto the typed store errors. Constraint violations
/// carry the semantics callers act on: a duplicate PNR is retried, a
/// duplicate email is a client error, a broken FK means the referenced
/// record vanished.
pub(crate) fn store_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        match db.code().as_deref() {
            Some("23505") => {
                let constraint = db.constraint().unwrap_or_default();
                if constraint.contains("pnr") {
                    return StoreError::PnrTaken;
                }
                if constraint.contains("email") {
                    return StoreError::EmailTaken;
                }
            }
            Some("23503") => return StoreError::NotFound("referenced record"),
            _ => {}
        }
    }
    StoreError::Storage(err.to_string())
}
