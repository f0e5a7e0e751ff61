//! Price aggregation for the remates system.
//!
//! This crate handles:
//! - Weighted-average price computation with authoritative-summary reconciliation
//! - Recent-auction price comparison tables
//! - Daily/monthly trend bucketing
//! - Head-count rankings by category and seller
//! - Per-auction category detail (premium price, top lot prices)
//! - Global dashboard statistics

pub mod comparison;
pub mod detail;
pub mod filter;
pub mod price;
pub mod ranking;
pub mod stats;
pub mod trend;

pub use comparison::PriceComparison;
pub use detail::CategoryDetail;
pub use price::{category_price, weighted_average};
pub use stats::GlobalStats;
pub use trend::{Granularity, TrendTable};
