use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::flight::FlightDetails;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub user_id: Uuid,
    pub flight_id: Uuid,
    pub passenger_name: String,
    /// 6-char reservation code, globally unique, immutable once assigned.
    pub pnr: String,
    /// Price charged at booking time. Never recomputed.
    pub final_price: i64,
    pub status: BookingStatus,
    pub flight_details: FlightDetails,
    pub booking_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
        }
    }
}

/// Everything the coordinator has decided about a booking before it is
/// committed. The store assigns the id and timestamp at commit.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub user_id: Uuid,
    pub flight_id: Uuid,
    pub passenger_name: String,
    pub pnr: String,
    pub final_price: i64,
    pub flight_details: FlightDetails,
}

/// A committed booking plus the wallet balance after its debit.
#[derive(Debug, Clone)]
pub struct BookingReceipt {
    pub booking: Booking,
    pub wallet_balance: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serialization() {
        assert_eq!(serde_json::to_string(&BookingStatus::Confirmed).unwrap(), "\"confirmed\"");
        let parsed: BookingStatus = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(parsed, BookingStatus::Cancelled);
    }
}
