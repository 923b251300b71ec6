use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub surge: SurgeRules,
    #[serde(default)]
    pub wallet: WalletRules,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expiration_seconds: u64,
}

/// Surge-pricing knobs. Defaults are the production rules: 10-minute
/// retention, 5-minute recent window, surge at 3 bookings, +10%.
#[derive(Debug, Deserialize, Clone)]
pub struct SurgeRules {
    #[serde(default = "default_retention_seconds")]
    pub retention_seconds: i64,
    #[serde(default = "default_recent_seconds")]
    pub recent_seconds: i64,
    #[serde(default = "default_surge_threshold")]
    pub surge_threshold: usize,
    #[serde(default = "default_surge_percentage")]
    pub surge_percentage: u32,
}

impl Default for SurgeRules {
    fn default() -> Self {
        Self {
            retention_seconds: default_retention_seconds(),
            recent_seconds: default_recent_seconds(),
            surge_threshold: default_surge_threshold(),
            surge_percentage: default_surge_percentage(),
        }
    }
}

fn default_retention_seconds() -> i64 {
    600
}
fn default_recent_seconds() -> i64 {
    300
}
fn default_surge_threshold() -> usize {
    3
}
fn default_surge_percentage() -> u32 {
    10
}

#[derive(Debug, Deserialize, Clone)]
pub struct WalletRules {
    /// Credit granted to every wallet at registration.
    #[serde(default = "default_starting_credit")]
    pub starting_credit: i64,
}

impl Default for WalletRules {
    fn default() -> Self {
        Self { starting_credit: default_starting_credit() }
    }
}

fn default_starting_credit() -> i64 {
    50_000
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(config::File::with_name("config/local").required(false))
            // `SKYFARE__SERVER__PORT=9000` overrides `server.port`.
            .add_source(config::Environment::with_prefix("SKYFARE").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
