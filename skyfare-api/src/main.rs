use std::net::SocketAddr;
use std::sync::Arc;

use skyfare_api::{app, state::{AppState, AuthConfig}};
use skyfare_booking::BookingCoordinator;
use skyfare_core::store::FlightStore;
use skyfare_pricing::{PricingService, WindowConfig};
use skyfare_store::{
    DbClient, PostgresBookingStore, PostgresFlightStore, PostgresUserStore, PostgresWalletStore,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skyfare_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = skyfare_store::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting Skyfare API on port {}", config.server.port);

    let db = DbClient::new(&config.database.url)
        .await
        .expect("Failed to connect to Postgres");
    db.migrate().await.expect("Failed to run migrations");

    let flights: Arc<dyn FlightStore> = Arc::new(PostgresFlightStore::new(db.pool.clone()));
    let wallets = Arc::new(PostgresWalletStore::new(db.pool.clone()));
    let bookings = Arc::new(PostgresBookingStore::new(db.pool.clone()));
    let users = Arc::new(PostgresUserStore::new(db.pool.clone()));

    let pricing = Arc::new(PricingService::new(
        flights.clone(),
        WindowConfig {
            retention_seconds: config.surge.retention_seconds,
            recent_seconds: config.surge.recent_seconds,
            surge_threshold: config.surge.surge_threshold,
            surge_percentage: config.surge.surge_percentage,
        },
    ));
    let coordinator = Arc::new(BookingCoordinator::new(
        flights.clone(),
        wallets.clone(),
        bookings.clone(),
        pricing.clone(),
    ));

    let app_state = AppState {
        users,
        flights,
        wallets,
        bookings,
        pricing,
        coordinator,
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
            expiration: config.auth.jwt_expiration_seconds,
        },
        wallet_rules: config.wallet.clone(),
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
