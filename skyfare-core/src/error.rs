/// Errors surfaced by the storage seam.
///
/// Insufficient funds and reservation-code collisions cross this seam as
/// data, not strings: the booking coordinator retries on `PnrTaken` and the
/// HTTP layer reports `required`/`available` amounts to the caller.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("insufficient wallet balance: required {required}, available {available}")]
    InsufficientFunds { required: i64, available: i64 },

    #[error("reservation code already in use")]
    PnrTaken,

    #[error("email already registered")]
    EmailTaken,

    #[error("storage failure: {0}")]
    Storage(String),
}

impl StoreError {
    /// A collision another attempt may not hit; safe to retry internally.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::PnrTaken)
    }
}
