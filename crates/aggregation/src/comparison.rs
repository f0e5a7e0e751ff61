//! Recent-auction price comparison table.
//!
//! The dashboard/widget table: one row per species, one column per auction
//! in the recent window, plus an overall average. Two-level aggregation:
//! weight-weighted within each auction, simple mean across auctions.

use remate_core::Auction;
use serde::{Deserialize, Serialize};

use crate::filter::{sort_by_date_desc, species_of};
use crate::price::{category_price, mean_price};

/// One cell of the comparison table. `precio` is `None` when the auction
/// had no data for the species.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub fecha: String,
    pub precio: Option<i64>,
}

/// One species row across the recent window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesRow {
    pub especie: String,
    /// Per-auction prices, oldest to newest.
    pub prices: Vec<PricePoint>,
    /// Simple mean of the available per-auction prices.
    pub promedio: i64,
}

/// Price comparison over the most recent auctions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceComparison {
    /// Auction dates, oldest to newest; indexes match each row's `prices`.
    pub fechas: Vec<String>,
    pub rows: Vec<SpeciesRow>,
}

impl PriceComparison {
    /// Build the table over the `window` most recent auctions.
    ///
    /// Auctions lacking a species are skipped in that species' average, not
    /// counted as zero.
    pub fn compute(auctions: &[Auction], window: usize) -> PriceComparison {
        let mut recent = auctions.to_vec();
        sort_by_date_desc(&mut recent);
        recent.truncate(window);
        // Columns read oldest to newest.
        recent.reverse();

        let species = species_of(&recent);
        let rows = species
            .into_iter()
            .map(|especie| {
                let prices: Vec<PricePoint> = recent
                    .iter()
                    .map(|a| PricePoint {
                        fecha: a.fecha.clone(),
                        precio: category_price(a, &especie),
                    })
                    .collect();
                let promedio = mean_price(prices.iter().filter_map(|p| p.precio)).unwrap_or(0);
                SpeciesRow {
                    especie,
                    prices,
                    promedio,
                }
            })
            .collect();

        PriceComparison {
            fechas: recent.iter().map(|a| a.fecha.clone()).collect(),
            rows,
        }
    }
}
