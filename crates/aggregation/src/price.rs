//! Weighted-average price computation.
//!
//! The single reconciliation point for authoritative category summaries:
//! wherever a per-category, per-auction price is needed, a summary supplied
//! by the feed supersedes anything derived from the (truncated) lot list.

use remate_core::{Auction, Lot};

/// Weight-weighted average unit price over a set of lots, rounded to the
/// nearest whole currency unit.
///
/// Returns `None` when there are no lots at all, and `0` when lots exist but
/// carry no recorded weight (a valid, degenerate input — never an error).
pub fn weighted_average<'a, I>(lots: I) -> Option<i64>
where
    I: IntoIterator<Item = &'a Lot>,
{
    let mut total_weight = 0.0;
    let mut total_value = 0.0;
    let mut seen = false;
    for lot in lots {
        seen = true;
        total_weight += lot.peso;
        total_value += lot.value();
    }
    if !seen {
        return None;
    }
    if total_weight > 0.0 {
        Some((total_value / total_weight).round() as i64)
    } else {
        Some(0)
    }
}

/// Average price for one category within one auction.
///
/// An authoritative [`CategorySummary`](remate_core::CategorySummary) wins
/// over the lot-derived figure; otherwise the weighted average over the
/// auction's matching lots is used. `None` means the auction has no data for
/// the category.
pub fn category_price(auction: &Auction, categoria: &str) -> Option<i64> {
    if let Some(summary) = auction.summary_for(categoria) {
        return Some(summary.pp_total.round() as i64);
    }
    weighted_average(auction.lots_in(categoria))
}

/// Unweighted arithmetic mean of per-auction prices, rounded. `None` when
/// the input is empty.
pub fn mean_price<I>(prices: I) -> Option<i64>
where
    I: IntoIterator<Item = i64>,
{
    let mut sum = 0i64;
    let mut count = 0i64;
    for p in prices {
        sum += p;
        count += 1;
    }
    if count == 0 {
        None
    } else {
        Some(((sum as f64) / (count as f64)).round() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use remate_core::CategorySummary;

    fn lot(tipo: &str, peso: f64, precio: f64) -> Lot {
        Lot {
            numero_lote: 0,
            cantidad: 1,
            peso,
            precio,
            vendedor: String::new(),
            tipo_lote: tipo.to_string(),
        }
    }

    fn auction(lots: Vec<Lot>, summaries: Option<Vec<CategorySummary>>) -> Auction {
        Auction {
            id: "a1".to_string(),
            recinto: "TEMUCO".to_string(),
            fecha: "15/03/24".to_string(),
            total_animales: 0,
            total_kilos: 0.0,
            lots,
            summaries,
        }
    }

    #[test]
    fn test_weighted_average_rounds() {
        // (100*1000 + 200*1500) / 300 = 1333.33... -> 1333
        let lots = vec![lot("N", 100.0, 1000.0), lot("N", 200.0, 1500.0)];
        assert_eq!(weighted_average(lots.iter()), Some(1333));
    }

    #[test]
    fn test_weighted_average_empty() {
        let lots: Vec<Lot> = Vec::new();
        assert_eq!(weighted_average(&lots), None);
    }

    #[test]
    fn test_weighted_average_zero_weight() {
        let lots = vec![lot("N", 0.0, 1200.0), lot("N", 0.0, 900.0)];
        assert_eq!(weighted_average(lots.iter()), Some(0));
    }

    #[test]
    fn test_category_price_from_lots() {
        let a = auction(
            vec![lot("NOVILLO", 100.0, 1000.0), lot("VAQUILLA", 50.0, 800.0)],
            None,
        );
        assert_eq!(category_price(&a, "NOVILLO"), Some(1000));
        assert_eq!(category_price(&a, "VAQUILLA"), Some(800));
        assert_eq!(category_price(&a, "TORO"), None);
    }

    #[test]
    fn test_summary_supersedes_lot_average() {
        // Lot-derived figure would be 1000, but the authoritative summary
        // covers animals the truncated lot list omits.
        let a = auction(
            vec![lot("NOVILLO", 100.0, 1000.0)],
            Some(vec![CategorySummary {
                descripcion: "NOVILLO".to_string(),
                cantidad_total: 200,
                peso_total: 90_000.0,
                pp_total: 1180.0,
            }]),
        );
        assert_eq!(category_price(&a, "NOVILLO"), Some(1180));
    }

    #[test]
    fn test_summary_for_other_category_does_not_interfere() {
        let a = auction(
            vec![lot("NOVILLO", 100.0, 1000.0)],
            Some(vec![CategorySummary {
                descripcion: "VAQUILLA".to_string(),
                cantidad_total: 10,
                peso_total: 4_000.0,
                pp_total: 990.0,
            }]),
        );
        assert_eq!(category_price(&a, "NOVILLO"), Some(1000));
    }

    #[test]
    fn test_mean_price() {
        assert_eq!(mean_price([1000, 1500]), Some(1250));
        assert_eq!(mean_price([1000, 1001]), Some(1001)); // 1000.5 rounds up
        assert_eq!(mean_price([]), None);
    }
}
