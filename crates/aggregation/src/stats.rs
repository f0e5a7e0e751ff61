//! Global dashboard statistics.

use remate_core::Auction;
use serde::{Deserialize, Serialize};

use crate::filter::species_of;
use crate::price::weighted_average;

/// A species and its pooled weighted-average price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesPrice {
    pub especie: String,
    pub precio: i64,
}

/// Headline figures over a (possibly venue-filtered) auction set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalStats {
    pub total_animales: u64,
    pub total_kilos: f64,
    pub total_remates: usize,
    pub species_count: usize,
    pub sellers_count: usize,
    pub recintos: Vec<String>,
    /// Species with the highest pooled weighted-average price.
    pub max_precio: Option<SpeciesPrice>,
    /// Species with the lowest pooled weighted-average price.
    pub min_precio: Option<SpeciesPrice>,
}

impl GlobalStats {
    /// Compute headline statistics. Totals use each auction's authoritative
    /// figures; the price extremes pool lots per species across the whole
    /// set.
    pub fn compute(auctions: &[Auction]) -> GlobalStats {
        let total_animales = auctions.iter().map(|a| a.total_animales as u64).sum();
        let total_kilos = auctions.iter().map(|a| a.total_kilos).sum();

        let mut recintos: Vec<String> = Vec::new();
        let mut sellers: Vec<&str> = Vec::new();
        for auction in auctions {
            let recinto = auction.recinto.to_uppercase();
            if !recintos.contains(&recinto) {
                recintos.push(recinto);
            }
            for lot in &auction.lots {
                if !sellers.contains(&lot.vendedor.as_str()) {
                    sellers.push(&lot.vendedor);
                }
            }
        }
        recintos.sort();

        let species = species_of(auctions);
        let mut max_precio: Option<SpeciesPrice> = None;
        let mut min_precio: Option<SpeciesPrice> = None;
        for especie in &species {
            let pool = auctions.iter().flat_map(|a| a.lots_in(especie));
            let Some(precio) = weighted_average(pool) else {
                continue;
            };
            // Strict comparisons: the first species seen keeps a tie.
            if max_precio.as_ref().map_or(true, |m| precio > m.precio) {
                max_precio = Some(SpeciesPrice {
                    especie: especie.clone(),
                    precio,
                });
            }
            if min_precio.as_ref().map_or(true, |m| precio < m.precio) {
                min_precio = Some(SpeciesPrice {
                    especie: especie.clone(),
                    precio,
                });
            }
        }

        GlobalStats {
            total_animales,
            total_kilos,
            total_remates: auctions.len(),
            species_count: species.len(),
            sellers_count: sellers.len(),
            recintos,
            max_precio,
            min_precio,
        }
    }
}
