//! Feed ingestion and normalization for the remates system.
//!
//! This crate handles:
//! - Feed format detection (CSV vs XML)
//! - CSV parsing with header aliasing
//! - XML parsing and raw-shape normalization
//! - Authoritative-total reconciliation

pub mod csv_feed;
pub mod feed;
pub mod xml_feed;

pub use feed::{parse_feed, FallbackMeta, FeedFormat, ParsedFeed};
