//! Per-auction category detail view.
//!
//! Alongside the full-category average, the detail view surfaces a "premium
//! price" over the highest-priced lots and the top individual lot prices
//! verbatim. The premium lot count is configuration, not a derived figure.

use ordered_float::OrderedFloat;
use remate_core::config::AggregationConfig;
use remate_core::{Auction, Lot};
use serde::{Deserialize, Serialize};

use crate::price::{category_price, weighted_average};

/// Detail figures for one category within one auction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryDetail {
    pub especie: String,
    /// Full-category average (authoritative summary wins when present).
    pub promedio: Option<i64>,
    /// Weight-averaged price of the top itemized lots by unit price.
    pub premium: Option<i64>,
    /// Top individual lot prices, highest first, verbatim.
    pub top_precios: Vec<f64>,
}

impl CategoryDetail {
    /// Compute the detail view for `categoria` within one auction.
    pub fn compute(auction: &Auction, categoria: &str, config: &AggregationConfig) -> CategoryDetail {
        let mut lots: Vec<&Lot> = auction.lots_in(categoria).collect();
        // Stable sort: equal prices keep feed order.
        lots.sort_by_key(|l| std::cmp::Reverse(OrderedFloat(l.precio)));

        let premium = weighted_average(lots.iter().take(config.premium_lot_count).copied());
        let top_precios = lots
            .iter()
            .take(config.top_lot_prices)
            .map(|l| l.precio)
            .collect();

        CategoryDetail {
            especie: categoria.to_string(),
            promedio: category_price(auction, categoria),
            premium,
            top_precios,
        }
    }
}
