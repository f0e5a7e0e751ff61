//! Configuration structures for the remates system.
//!
//! Read once at process start and never mutated; the server holds the
//! resulting value in shared state for concurrent read-only use.

use serde::{Deserialize, Serialize};

/// Main configuration for the remates service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Backend store configuration.
    pub backend: BackendConfig,
    /// HTTP server configuration.
    pub server: ServerConfig,
    /// Aggregation configuration.
    pub aggregation: AggregationConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendConfig::default(),
            server: ServerConfig::default(),
            aggregation: AggregationConfig::default(),
        }
    }
}

impl Config {
    /// Build a configuration from environment variables, falling back to
    /// defaults for anything unset.
    ///
    /// Recognized variables: `REMATES_DB` (SQLite path), `REMATES_LOCAL_DB`
    /// (JSON fallback path), `REMATES_USE_LOCAL` (serve auctions from the
    /// JSON fallback), `REMATES_ADDR` (bind address).
    pub fn from_env() -> Self {
        let mut config = Config::default();
        if let Ok(path) = std::env::var("REMATES_DB") {
            config.backend.database_path = path;
        }
        if let Ok(path) = std::env::var("REMATES_LOCAL_DB") {
            config.backend.local_fallback_path = path;
        }
        if let Ok(flag) = std::env::var("REMATES_USE_LOCAL") {
            config.backend.use_local_fallback = matches!(flag.as_str(), "1" | "true" | "yes");
        }
        if let Ok(addr) = std::env::var("REMATES_ADDR") {
            config.server.bind_addr = addr;
        }
        config
    }
}

/// Backend store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Path to the SQLite database file.
    pub database_path: String,
    /// Path to the local JSON fallback store (development/offline only;
    /// not durable across deployments).
    pub local_fallback_path: String,
    /// Use the local JSON fallback instead of the SQLite backend.
    pub use_local_fallback: bool,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            database_path: "data/remates.db".to_string(),
            local_fallback_path: "data/auctions.json".to_string(),
            use_local_fallback: false,
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to bind, e.g. "0.0.0.0:3000".
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
        }
    }
}

/// Aggregation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregationConfig {
    /// How many recent auctions the price-comparison table covers.
    pub recent_auction_window: usize,
    /// How many top-priced lots feed the per-category premium price.
    pub premium_lot_count: usize,
    /// How many individual top lot prices the detail view surfaces.
    pub top_lot_prices: usize,
    /// How many sellers the top-seller ranking returns.
    pub top_sellers: usize,
    /// Longest from/to span (days) still charted at daily granularity;
    /// longer spans bucket by calendar month.
    pub daily_granularity_max_days: i64,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            recent_auction_window: 5,
            premium_lot_count: 13,
            top_lot_prices: 5,
            top_sellers: 10,
            daily_granularity_max_days: 184,
        }
    }
}
