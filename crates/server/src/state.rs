use std::sync::Arc;

use remate_core::Config;
use remate_store::{AuctionStore, ChatStore};

/// Shared application state available to all route handlers via Axum's
/// `State` extractor.
///
/// Constructed once in `main` and never mutated afterwards; every request
/// reads the same configuration and talks to the same injected stores.
pub struct AppState {
    /// Process-wide configuration, read from the environment at startup.
    pub config: Config,

    /// Auction repository (SQLite backend, or the JSON-file fallback when
    /// configured for offline development).
    pub store: Arc<dyn AuctionStore>,

    /// Live-stream chat store and insert pub/sub hub.
    pub chat: ChatStore,
}
