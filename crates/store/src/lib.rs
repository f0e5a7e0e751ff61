//! Persistence for the remates system.
//!
//! This crate handles:
//! - The `AuctionStore` repository seam
//! - The SQLite backend with schema-evolution tolerance
//! - A local JSON-file fallback for development/offline use
//! - The live-stream chat channel (append-only log + insert pub/sub)

pub mod chat;
pub mod json_file;
pub mod sqlite;

pub use chat::ChatStore;
pub use json_file::JsonFileStore;
pub use sqlite::SqliteStore;

use remate_core::{Auction, Result};

/// Venue filter for [`AuctionStore::list`]; matching is exact but
/// case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct AuctionFilter {
    pub recinto: Option<String>,
}

impl AuctionFilter {
    /// Filter for one venue.
    pub fn recinto(recinto: impl Into<String>) -> Self {
        Self {
            recinto: Some(recinto.into()),
        }
    }

    pub(crate) fn matches(&self, auction: &Auction) -> bool {
        match &self.recinto {
            None => true,
            Some(r) => auction.recinto.to_uppercase() == r.to_uppercase(),
        }
    }
}

/// Repository seam over durable auction storage.
///
/// Auctions are written once and never updated; the only mutation is
/// whole-record deletion. Every operation may fail with
/// [`BackendUnavailable`](remate_core::Error::BackendUnavailable).
pub trait AuctionStore: Send + Sync {
    /// List auctions, newest first, optionally filtered by venue.
    fn list(&self, filter: Option<&AuctionFilter>) -> Result<Vec<Auction>>;

    /// Persist one auction. A draft with an empty `id` gets one assigned;
    /// the stored record is returned.
    fn save(&self, auction: Auction) -> Result<Auction>;

    /// Delete by id. Returns `false` when the id did not exist — deletion is
    /// idempotent, not an error.
    fn delete_by_id(&self, id: &str) -> Result<bool>;

    /// Fetch one auction by id.
    fn get_by_id(&self, id: &str) -> Result<Option<Auction>>;
}

/// Assign a fresh id to a draft, leaving already-ingested records alone.
pub(crate) fn ensure_id(mut auction: Auction) -> Auction {
    if auction.id.is_empty() {
        auction.id = uuid::Uuid::new_v4().to_string();
    }
    auction
}

/// Order auctions newest-first by parsed `fecha`; unparseable dates last.
pub(crate) fn sort_newest_first(auctions: &mut [Auction]) {
    auctions.sort_by(|a, b| match (a.date(), b.date()) {
        (Some(da), Some(db)) => db.cmp(&da),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
}
