pub mod booking;
pub mod error;
pub mod flight;
pub mod memory;
pub mod pnr;
pub mod store;
pub mod user;
pub mod wallet;

pub use error::StoreError;
