use std::sync::Arc;

use skyfare_booking::BookingCoordinator;
use skyfare_core::store::{BookingStore, FlightStore, UserStore, WalletStore};
use skyfare_pricing::PricingService;
use skyfare_store::app_config::WalletRules;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub flights: Arc<dyn FlightStore>,
    pub wallets: Arc<dyn WalletStore>,
    pub bookings: Arc<dyn BookingStore>,
    pub pricing: Arc<PricingService>,
    pub coordinator: Arc<BookingCoordinator>,
    pub auth: AuthConfig,
    pub wallet_rules: WalletRules,
}
