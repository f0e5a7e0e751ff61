//! Core types and configuration for the remates system.
//!
//! This crate provides shared types used across all other crates:
//! - Auction data types (auctions, lots, category summaries)
//! - Live-stream chat contract entities
//! - Configuration structures
//! - Common error types

pub mod config;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use types::*;
